use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::aggregates::{LabelMap, Product, ProductRecord, IN_STOCK_COUNT};
use crate::domain::value_objects::Localized;

fn labels(pairs: &[(&str, &str, &str)]) -> LabelMap {
    let en: BTreeMap<String, String> = pairs.iter().map(|(k, en, _)| (k.to_string(), en.to_string())).collect();
    let ar: BTreeMap<String, String> = pairs.iter().map(|(k, _, ar)| (k.to_string(), ar.to_string())).collect();
    Localized::new(en, ar)
}

fn strings(items: &[&str]) -> Option<Vec<String>> { Some(items.iter().map(|s| s.to_string()).collect()) }

/// Demo catalog used when no database is configured, priced in `currency`.
pub fn sample_products(currency: &str) -> Vec<Product> {
    let currency = currency.to_uppercase();
    let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();
    let records = vec![
        ProductRecord {
            id: Uuid::from_u128(1),
            name_en: "Classic White Dress Shirt".into(),
            name_ar: "قميص أبيض كلاسيكي".into(),
            category_en: "Shirts".into(),
            category_ar: "قمصان".into(),
            price: Decimal::new(299, 0),
            rating: Some(4.8),
            description_en: Some("Premium cotton dress shirt perfect for formal occasions".into()),
            description_ar: Some("قميص قطني فاخر مثالي للمناسبات الرسمية".into()),
            images: strings(&["/mens-white-dress-shirt.png", "/white-dress-shirt-front.png", "/white-dress-shirt-back.png"]),
            colors: strings(&["White", "Light Blue", "Light Pink"]),
            sizes: strings(&["S", "M", "L", "XL", "XXL"]),
            color_names: Some(sqlx::types::Json(labels(&[
                ("White", "White", "أبيض"),
                ("Light Blue", "Light Blue", "أزرق فاتح"),
                ("Light Pink", "Light Pink", "وردي فاتح"),
            ]))),
            size_names: Some(sqlx::types::Json(labels(&[
                ("S", "Small", "صغير"),
                ("M", "Medium", "متوسط"),
                ("L", "Large", "كبير"),
                ("XL", "Extra Large", "كبير جداً"),
                ("XXL", "Double XL", "كبير جداً جداً"),
            ]))),
            ..Default::default()
        },
        ProductRecord {
            id: Uuid::from_u128(2),
            name_en: "Classic Blue Jeans".into(),
            name_ar: "جينز أزرق كلاسيكي".into(),
            category_en: "Jeans".into(),
            category_ar: "جينز".into(),
            price: Decimal::new(450, 0),
            rating: Some(4.6),
            description_en: Some("Comfortable and durable denim jeans for everyday wear".into()),
            description_ar: Some("جينز دنيم مريح ومتين للارتداء اليومي".into()),
            images: strings(&["/mens-classic-blue-jeans.png", "/blue-jeans-side.png", "/blue-jeans-back-pocket.png"]),
            colors: strings(&["Dark Blue", "Light Blue", "Black"]),
            sizes: strings(&["28", "30", "32", "34", "36", "38"]),
            color_names: Some(sqlx::types::Json(labels(&[
                ("Dark Blue", "Dark Blue", "أزرق داكن"),
                ("Light Blue", "Light Blue", "أزرق فاتح"),
                ("Black", "Black", "أسود"),
            ]))),
            ..Default::default()
        },
        ProductRecord {
            id: Uuid::from_u128(3),
            name_en: "Navy Wool Blazer".into(),
            name_ar: "بليزر صوفي كحلي".into(),
            category_en: "Blazers".into(),
            category_ar: "بليزرات".into(),
            price: Decimal::new(899, 0),
            rating: Some(4.9),
            description_en: Some("Elegant wool blazer for professional and formal settings".into()),
            description_ar: Some("بليزر صوفي أنيق للإعدادات المهنية والرسمية".into()),
            images: strings(&["/mens-navy-wool-blazer.png", "/navy-blazer-detail.png", "/placeholder.svg"]),
            colors: strings(&["Navy", "Charcoal", "Black"]),
            sizes: strings(&["S", "M", "L", "XL"]),
            color_names: Some(sqlx::types::Json(labels(&[
                ("Navy", "Navy", "كحلي"),
                ("Charcoal", "Charcoal", "فحمي"),
                ("Black", "Black", "أسود"),
            ]))),
            ..Default::default()
        },
    ];
    records
        .into_iter()
        .map(|r| Product::from_record(ProductRecord { stock: Some(IN_STOCK_COUNT), created_at, currency: Some(currency.clone()), ..r }, &currency))
        .collect()
}
