//! Entity module - Contains all SeaORM entity definitions for the catalog store.
//! The four record types (category, subcategory, company, product) each get a table;
//! their many-to-many links are explicit association tables.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod category;
pub mod company;
pub mod company_category;
pub mod company_subcategory;
pub mod product;
pub mod product_category;
pub mod product_feature;
pub mod product_subcategory;
pub mod subcategory;

// Re-export specific types to avoid conflicts
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use company::{Column as CompanyColumn, Entity as Company, Model as CompanyModel};
pub use company_category::Entity as CompanyCategory;
pub use company_subcategory::Entity as CompanySubcategory;
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use product_category::Entity as ProductCategory;
pub use product_feature::Entity as ProductFeature;
pub use product_subcategory::Entity as ProductSubcategory;
pub use subcategory::{
    Column as SubcategoryColumn, Entity as Subcategory, Model as SubcategoryModel,
};
