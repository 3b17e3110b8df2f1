//! Database entities

pub mod about_content;
pub mod admin_user;
pub mod brand;
pub mod category;
pub mod contact_info;
pub mod contact_message;
pub mod feature;
pub mod feature_value;
pub mod image;
pub mod news_item;
pub mod product;
pub mod product_feature;
pub mod product_tag_group;
pub mod product_tag_group_tag;
pub mod revoked_token;
pub mod tag;
pub mod tag_name;

pub use about_content::Entity as AboutContent;
pub use admin_user::Entity as AdminUser;
pub use brand::Entity as Brand;
pub use category::Entity as Category;
pub use contact_info::Entity as ContactInfo;
pub use contact_message::Entity as ContactMessage;
pub use feature::Entity as Feature;
pub use feature_value::Entity as FeatureValue;
pub use image::Entity as Image;
pub use news_item::Entity as NewsItem;
pub use product::Entity as Product;
pub use product_feature::Entity as ProductFeature;
pub use product_tag_group::Entity as ProductTagGroup;
pub use product_tag_group_tag::Entity as ProductTagGroupTag;
pub use revoked_token::Entity as RevokedToken;
pub use tag::Entity as Tag;
pub use tag_name::Entity as TagName;

pub mod prelude {
    pub use super::about_content::Entity as AboutContent;
    pub use super::admin_user::Entity as AdminUser;
    pub use super::brand::Entity as Brand;
    pub use super::category::Entity as Category;
    pub use super::contact_info::Entity as ContactInfo;
    pub use super::contact_message::Entity as ContactMessage;
    pub use super::feature::Entity as Feature;
    pub use super::feature_value::Entity as FeatureValue;
    pub use super::image::Entity as Image;
    pub use super::news_item::Entity as NewsItem;
    pub use super::product::Entity as Product;
    pub use super::product_feature::Entity as ProductFeature;
    pub use super::product_tag_group::Entity as ProductTagGroup;
    pub use super::product_tag_group_tag::Entity as ProductTagGroupTag;
    pub use super::revoked_token::Entity as RevokedToken;
    pub use super::tag::Entity as Tag;
    pub use super::tag_name::Entity as TagName;
}
