//! Frontend-facing response shapes.
//!
//! The storefront reads snake_case aliases (`image_url`, `stock_quantity`,
//! `original_price`, `reviews_count`, `is_pipe`, `total_amount`) alongside
//! the camelCase entity fields; both spellings must be present and agree.

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;

use tricity_core::{
    AddressId, CategoryId, Email, OrderId, OrderItemId, OrderStatus, PincodeId, ProductId,
    ProductImageId, Role, UserId,
};

use tricity_api::models::address::{Address, AddressView, Pincode};
use tricity_api::models::category::{Category, CategoryView};
use tricity_api::models::order::{Order, OrderItem, OrderItemView, OrderView};
use tricity_api::models::product::{Product, ProductImage, ProductView, ProductWithRelations};
use tricity_api::models::user::User;

fn dec(s: &str) -> Decimal {
    s.parse().expect("valid decimal")
}

fn sample_category() -> Category {
    Category {
        id: CategoryId::new(3),
        name: "Faucets".to_owned(),
        description: Some("Bath fittings".to_owned()),
        image_url: Some("https://img.example/faucets.jpg".to_owned()),
    }
}

fn sample_product() -> Product {
    Product {
        id: ProductId::new(41),
        name: "Single-lever basin mixer".to_owned(),
        description: None,
        image_url: Some("https://img.example/mixer.jpg".to_owned()),
        price: dec("2499.00"),
        original_price: Some(dec("2999.00")),
        category_id: CategoryId::new(3),
        available_stock: 14,
        stock_quantity: 14,
        rating: dec("4.3"),
        reviews_count: 27,
        tax_percent: dec("18"),
        is_featured: true,
        is_bestseller: false,
        is_pipe: false,
        item_code: "ITEM-MX41".to_owned(),
        brand_group: None,
        sdp: None,
        nrp: None,
        mrp: Some(dec("2999.00")),
        hsn: Some("8481".to_owned()),
        sgst: Some(dec("9")),
        cgst: Some(dec("9")),
        igst: None,
        cess: None,
        created_at: Utc::now(),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).expect("serializable")
}

#[test]
fn product_views_carry_both_spellings() {
    let full = ProductWithRelations {
        product: sample_product(),
        category: Some(sample_category()),
        images: vec![ProductImage {
            id: ProductImageId::new(7),
            product_id: ProductId::new(41),
            image_url: "https://img.example/mixer-side.jpg".to_owned(),
            alt_text: Some("Side view".to_owned()),
            sort_order: 0,
        }],
    };

    let json = to_json(&ProductView::from(full));

    // camelCase entity fields
    assert_eq!(json["imageUrl"], "https://img.example/mixer.jpg");
    assert_eq!(json["availableStock"], 14);
    assert_eq!(json["reviewsCount"], 27);
    assert_eq!(json["isPipe"], false);

    // snake_case aliases agree with them
    assert_eq!(json["image_url"], json["imageUrl"]);
    assert_eq!(json["stock_quantity"], json["availableStock"]);
    assert_eq!(json["original_price"], json["originalPrice"]);
    assert_eq!(json["reviews_count"], json["reviewsCount"]);
    assert_eq!(json["is_pipe"], json["isPipe"]);

    // embedded image carries both spellings too
    let image = &json["images"][0];
    assert_eq!(image["image_url"], image["imageUrl"]);
    assert_eq!(image["alt_text"], image["altText"]);
    assert_eq!(image["sort_order"], image["sortOrder"]);

    // category rides along
    assert_eq!(json["category"]["name"], "Faucets");
    assert_eq!(json["category"]["image_url"], json["category"]["imageUrl"]);
}

#[test]
fn bare_product_views_omit_relations() {
    let json = to_json(&ProductView::bare(sample_product()));

    assert!(json.get("category").is_none());
    assert!(json.get("images").is_none());
    assert_eq!(json["stock_quantity"], 14);
}

#[test]
fn category_views_alias_the_image_url() {
    let json = to_json(&CategoryView::from(sample_category()));

    assert_eq!(json["imageUrl"], "https://img.example/faucets.jpg");
    assert_eq!(json["image_url"], json["imageUrl"]);
}

#[test]
fn order_views_alias_totals_and_address() {
    let order = Order {
        id: OrderId::new(9),
        user_id: UserId::new(2),
        total_price: dec("348.47"),
        total_amount: dec("348.47"),
        address_id: Some(AddressId::new(5)),
        payment_method: Some("upi".to_owned()),
        payment_id: None,
        status: OrderStatus::Pending,
        created_at: Utc::now(),
    };
    let items = vec![OrderItemView {
        item: OrderItem {
            id: OrderItemId::new(1),
            order_id: OrderId::new(9),
            product_id: ProductId::new(41),
            quantity: 2,
            price: dec("118.00"),
        },
        product: None,
    }];

    let json = to_json(&OrderView::new(order, items));

    assert_eq!(json["totalAmount"], json["total_amount"]);
    assert_eq!(json["addressId"], json["address_id"]);
    assert_eq!(json["paymentMethod"], json["payment_method"]);
    assert_eq!(json["status"], "pending");

    // captured line price, not the product's live price
    assert_eq!(json["items"][0]["price"], 118.0);
    assert_eq!(json["items"][0]["quantity"], 2);
}

#[test]
fn address_views_embed_the_resolved_pincode() {
    let pincode = Pincode {
        id: PincodeId::new(1),
        code: 160_062,
        delivery_price: dec("100.0"),
    };
    let address = Address {
        id: AddressId::new(5),
        user_id: UserId::new(2),
        label: "Home".to_owned(),
        house: "12-B".to_owned(),
        street: "Phase 7".to_owned(),
        landmark: None,
        address1: None,
        city: "mohali".to_owned(),
        pincode_id: pincode.id,
        created_at: Utc::now(),
    };

    let json = to_json(&AddressView::new(address, &pincode));

    assert_eq!(json["pincodeValue"], 160_062);
    assert_eq!(json["deliveryPrice"], 100.0);
    assert_eq!(json["label"], "Home");
}

#[test]
fn users_serialize_without_credentials() {
    let user = User {
        id: UserId::new(2),
        name: "Asha".to_owned(),
        email: Email::parse("asha@x.com").expect("valid email"),
        phone: "9876500000".to_owned(),
        city: "Chandigarh".to_owned(),
        address: None,
        role: Role::Customer,
        is_tricity: true,
        is_blocked: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let json = to_json(&user);

    assert_eq!(json["role"], "customer");
    assert_eq!(json["isTricity"], true);
    assert!(json.get("password").is_none());
    assert!(json.get("passwordHash").is_none());
}
