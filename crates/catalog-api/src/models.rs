//! Request and response bodies

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::query::parse_decimal;

/// Distinguish an absent key (`None`) from an explicit `null` (`Some(None)`)
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Like [`nullable`] for prices: numbers, numeric strings, `""` and `null` are accepted
pub fn nullable_price<'de, D>(deserializer: D) -> Result<Option<Option<Decimal>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(Some(None)),
        serde_json::Value::String(s) if s.trim().is_empty() => Ok(Some(None)),
        serde_json::Value::String(s) => parse_decimal(&s)
            .map(|d| Some(Some(d)))
            .ok_or_else(|| D::Error::custom("A valid number is required.")),
        serde_json::Value::Number(n) => parse_decimal(&n.to_string())
            .map(|d| Some(Some(d)))
            .ok_or_else(|| D::Error::custom("A valid number is required.")),
        _ => Err(D::Error::custom("A valid number is required.")),
    }
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Plain confirmation message
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `{id, name}` pair used by vocabulary lookups
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IdName {
    pub id: i32,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Public catalog
// ---------------------------------------------------------------------------

/// Category with its subtree
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(no_recursion)]
pub struct CategoryTreeNode {
    pub id: i32,
    pub name: String,
    pub slug: String,
    /// Image URL
    pub image: Option<String>,
    /// Parent category id
    pub parent: Option<i32>,
    pub children: Vec<CategoryTreeNode>,
    /// Products in this category and all of its descendants
    pub products_count: u64,
}

/// Tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TagItem {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

/// Tag with the number of product tag groups using it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TagWithCount {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub count: u64,
}

/// Tags of a listing grouped under their tag name
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TagGroupFacet {
    /// Tag name id
    pub id: i32,
    pub group_name: String,
    pub tags: Vec<TagItem>,
}

/// Public brand view
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BrandItem {
    pub id: i32,
    pub name: String,
    pub slug: String,
    /// Logo URL
    pub image: Option<String>,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products_count: Option<u64>,
}

/// Product image
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageItem {
    pub id: i32,
    /// Image URL
    pub image: Option<String>,
    pub is_main: bool,
    pub order: i32,
}

/// Feature value attached to a product
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductFeatureItem {
    pub id: i32,
    pub feature_name: Option<String>,
    pub feature_id: Option<i32>,
    pub value_id: Option<i32>,
    pub value_name: Option<String>,
}

/// Tag group attached to a product
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductTagGroupItem {
    pub id: i32,
    /// Tag name id
    pub group_name: Option<i32>,
    pub tags: Vec<TagItem>,
}

/// Product as shown in listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductListItem {
    pub id: i32,
    pub name: String,
    pub slug: String,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub is_available: bool,
    /// Main image, else the first image
    pub main_image: Option<ImageItem>,
    pub category: Option<CategoryTreeNode>,
    pub category_id: i32,
    pub manufacturer_sku: Option<String>,
    pub internal_sku: Option<String>,
    pub features: Vec<ProductFeatureItem>,
    /// Distinct tags across the product's tag groups
    pub tags: Vec<TagItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product with everything attached
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductDetail {
    pub id: i32,
    pub brand: Option<BrandItem>,
    pub name: String,
    pub slug: String,
    pub description: String,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub is_available: bool,
    pub category: Option<CategoryTreeNode>,
    pub images: Vec<ImageItem>,
    pub features: Vec<ProductFeatureItem>,
    pub manufacturer_sku: Option<String>,
    pub internal_sku: Option<String>,
    pub tag_groups: Vec<ProductTagGroupItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `{feature_id, value_id}` pair of a product write
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct FeatureInput {
    #[serde(default)]
    pub feature_id: Option<i32>,
    #[serde(default)]
    pub value_id: Option<i32>,
}

/// Create or update a product through the public API
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProductWriteRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable_price")]
    #[schema(value_type = Option<String>)]
    pub price: Option<Option<Decimal>>,
    pub is_available: Option<bool>,
    pub category_id: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i32>)]
    pub brand_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub manufacturer_sku: Option<Option<String>>,
    pub internal_sku: Option<String>,
    /// Replaces every feature of the product when present
    pub features: Option<Vec<FeatureInput>>,
}

/// Lowest and highest price of a listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PriceRange {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

/// Image stored by an upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadedImage {
    pub id: i32,
    pub image: Option<String>,
}

/// Response of a multi-image upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadedImages {
    pub images: Vec<UploadedImage>,
}

/// News item as shown in listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewsListItem {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub preview: String,
    pub image: String,
    pub pub_date: DateTime<Utc>,
}

/// News item with content
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewsDetail {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub preview: String,
    pub image: String,
    pub pub_date: DateTime<Utc>,
}

/// "About us" page
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AboutContentResponse {
    pub title: String,
    pub content: String,
    pub image: String,
}

/// Contact details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactInfoResponse {
    pub phone: String,
    pub email: String,
    pub address: String,
    pub map_url: Option<String>,
}

/// Visitor message
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ContactMessageRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

/// Feature value as listed for a category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeatureValueFacet {
    pub id: i32,
    pub value: String,
    pub feature_id: Option<i32>,
    #[serde(rename = "feature__name")]
    pub feature_name: Option<String>,
}

/// Vocabulary available to products of one category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryVocabulary {
    pub features: Vec<IdName>,
    pub tags: Vec<IdName>,
    pub tag_names: Vec<IdName>,
    pub feature_values: Vec<FeatureValueFacet>,
}

/// Feature value
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeatureValueItem {
    pub id: i32,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Admin: auth
// ---------------------------------------------------------------------------

/// Admin account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminUserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Login request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Issued token pair
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Access token (30 minutes by default)
    pub access: String,
    /// Refresh token (7 days by default)
    pub refresh: String,
    pub user: AdminUserResponse,
}

/// Refresh or logout request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

/// New access token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub access: String,
}

/// Change password request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

/// Profile update request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Dashboard counters
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub products_count: u64,
    pub categories_count: u64,
    pub brands_count: u64,
    pub news_count: u64,
    pub published_news_count: u64,
    pub unread_messages: u64,
    pub total_messages: u64,
    pub available_products: u64,
    pub tags_count: u64,
    pub features_count: u64,
}

// ---------------------------------------------------------------------------
// Admin: products
// ---------------------------------------------------------------------------

/// Tag group of an admin product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TagGroupInput {
    #[serde(default)]
    pub group_name_id: Option<i32>,
    #[serde(default)]
    pub tag_ids: Vec<i32>,
}

/// In-place edit of one product image
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ImageEditInput {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub is_main: Option<bool>,
    #[serde(default)]
    pub order: Option<i32>,
    /// Delete the image instead of editing it
    #[serde(default, rename = "_delete")]
    pub delete: bool,
}

/// Admin product payload; absent keys leave the stored value alone
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AdminProductRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub slug: Option<Option<String>>,
    pub description: Option<String>,
    /// Category id
    pub category: Option<i32>,
    /// Brand id; `null` clears it
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i32>)]
    pub brand: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable_price")]
    #[schema(value_type = Option<String>)]
    pub price: Option<Option<Decimal>>,
    pub is_available: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub manufacturer_sku: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub internal_sku: Option<Option<String>>,
    /// Replaces all features when present
    pub features: Option<Vec<FeatureInput>>,
    /// Replaces all tag groups when present
    pub tag_groups: Option<Vec<TagGroupInput>>,
    /// Per-image edits; images not listed are untouched
    pub images: Option<Vec<ImageEditInput>>,
}

/// Feature row of an admin product
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminProductFeature {
    pub id: i32,
    pub feature_id: Option<i32>,
    pub feature_name: Option<String>,
    pub value_id: Option<i32>,
    pub value_text: Option<String>,
}

/// Tag group of an admin product
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminProductTagGroup {
    pub id: i32,
    pub group_name_id: Option<i32>,
    pub group_name_text: Option<String>,
    pub tag_ids: Vec<i32>,
}

/// Product as edited in the admin
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminProduct {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub category: i32,
    pub category_name: Option<String>,
    pub brand: Option<i32>,
    pub brand_name: Option<String>,
    pub is_available: bool,
    pub manufacturer_sku: Option<String>,
    pub internal_sku: Option<String>,
    pub created_at: DateTime<Utc>,
    pub images_count: u64,
    /// URL of the main image, else the first image
    pub main_image: Option<String>,
    pub images: Vec<ImageItem>,
    pub features: Vec<AdminProductFeature>,
    pub tag_groups: Vec<AdminProductTagGroup>,
}

/// Result of deleting one product image
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

// ---------------------------------------------------------------------------
// Admin: categories and brands
// ---------------------------------------------------------------------------

/// Category as edited in the admin
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminCategory {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub parent: Option<i32>,
    pub parent_name: Option<String>,
    /// Image URL
    pub image: Option<String>,
    pub order: i32,
    /// Products directly in this category
    pub products_count: u64,
}

/// Category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AdminCategoryRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub slug: Option<Option<String>>,
    /// Parent id; `null` makes the category a root
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i32>)]
    pub parent: Option<Option<i32>>,
    pub order: Option<i32>,
}

/// Stored category image
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageUrlResponse {
    pub image: Option<String>,
}

/// Brand as edited in the admin
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminBrand {
    pub id: i32,
    pub name: String,
    pub slug: String,
    /// Stored logo path
    pub logo: Option<String>,
    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub products_count: u64,
}

/// Brand payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AdminBrandRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub slug: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

/// Stored brand logo
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogoUrlResponse {
    pub logo: Option<String>,
}

// ---------------------------------------------------------------------------
// Admin: vocabularies
// ---------------------------------------------------------------------------

/// Tag as edited in the admin
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminTag {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub category: Option<i32>,
    pub category_name: Option<String>,
}

/// Tag name as edited in the admin
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminTagName {
    pub id: i32,
    pub name: String,
    pub category: Option<i32>,
    pub category_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Feature as edited in the admin
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminFeature {
    pub id: i32,
    pub name: String,
    pub category: i32,
    pub category_name: Option<String>,
}

/// Feature value as edited in the admin
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminFeatureValue {
    pub id: i32,
    pub value: String,
    pub feature: Option<i32>,
    pub category: Option<i32>,
    pub category_name: Option<String>,
}

/// Payload shared by tags, tag names, features and feature values.
///
/// `name` is read as `value` for feature values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct VocabularyRequest {
    #[serde(alias = "value")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub slug: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i32>)]
    pub category: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i32>)]
    pub feature: Option<Option<i32>>,
}

// ---------------------------------------------------------------------------
// Admin: content
// ---------------------------------------------------------------------------

/// News item as edited in the admin
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminNews {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub preview: String,
    pub content: String,
    pub image: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
}

/// News payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AdminNewsRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub slug: Option<Option<String>>,
    pub preview: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
    pub is_published: Option<bool>,
}

/// Product image as edited in the admin
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminImage {
    pub id: i32,
    pub product: i32,
    /// Image URL
    pub image: Option<String>,
    pub is_main: bool,
    pub order: i32,
}

/// Image payload; the file itself goes through the upload endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AdminImageRequest {
    pub product: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub image: Option<Option<String>>,
    pub is_main: Option<bool>,
    pub order: Option<i32>,
}

/// "About us" page as edited in the admin
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminAboutContent {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub image: String,
    pub updated_at: DateTime<Utc>,
}

/// "About us" payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AdminAboutRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
}

/// Contact details as edited in the admin
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminContactInfo {
    pub id: i32,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub map_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Contact details payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AdminContactRequest {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub map_url: Option<Option<String>>,
}

/// Visitor message as seen in the admin
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminMessage {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub is_processed: bool,
}

/// Message payload; everything but the processed flag is read-only
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AdminMessageRequest {
    pub is_processed: Option<bool>,
}

/// Result of a processed/unprocessed toggle
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageStatusResponse {
    pub status: String,
    pub id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_and_null_are_distinct() {
        let absent: AdminProductRequest = serde_json::from_str(r#"{"name": "Drill"}"#).unwrap();
        assert_eq!(absent.brand, None);
        assert_eq!(absent.price, None);

        let cleared: AdminProductRequest =
            serde_json::from_str(r#"{"brand": null, "price": ""}"#).unwrap();
        assert_eq!(cleared.brand, Some(None));
        assert_eq!(cleared.price, Some(None));

        let set: AdminProductRequest =
            serde_json::from_str(r#"{"brand": 3, "price": "12.50"}"#).unwrap();
        assert_eq!(set.brand, Some(Some(3)));
        assert_eq!(set.price, Some(Some(Decimal::new(1250, 2))));
    }

    #[test]
    fn test_numeric_price() {
        let request: ProductWriteRequest = serde_json::from_str(r#"{"price": 99.9}"#).unwrap();
        assert_eq!(request.price, Some(Some(Decimal::new(999, 1))));

        assert!(serde_json::from_str::<ProductWriteRequest>(r#"{"price": "cheap"}"#).is_err());
    }

    #[test]
    fn test_feature_value_facet_field_name() {
        let facet = FeatureValueFacet {
            id: 1,
            value: "Red".to_string(),
            feature_id: Some(2),
            feature_name: Some("Color".to_string()),
        };
        let json = serde_json::to_value(&facet).unwrap();
        assert_eq!(json["feature__name"], "Color");
    }

    #[test]
    fn test_image_edit_delete_flag() {
        let edit: ImageEditInput = serde_json::from_str(r#"{"id": 4, "_delete": true}"#).unwrap();
        assert_eq!(edit.id, Some(4));
        assert!(edit.delete);
    }
}
