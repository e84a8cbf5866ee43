//! Entities, filters and mappers shared by the scenario tests.
//!
//! `products` optionally belong to a `category` and have any number of
//! `reviews`. `stock_levels` has a composite key. `tickets` has a key the
//! backend generates.

use jiff::Timestamp;
use rust_decimal::Decimal;
use std::sync::Arc;
use tessera::{
    Attribute, Condition, Db, EntityMapper, JoinEntityMapper, JoinKind, JoinRepository,
    Repository,
};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: Option<String>,
    pub stock: i32,
    pub active: bool,
    pub released_at: Option<Timestamp>,
}

impl Product {
    pub fn new(id: &str, name: &str, price: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            price: price.parse().unwrap(),
            active: true,
            ..Product::default()
        }
    }

    pub fn in_category(self, category_id: &str) -> Product {
        Product {
            category_id: Some(category_id.to_string()),
            ..self
        }
    }

    pub fn with_stock(self, stock: i32) -> Product {
        Product { stock, ..self }
    }

    pub fn with_description(self, description: &str) -> Product {
        Product {
            description: Some(description.to_string()),
            ..self
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProductFilter {
    pub ids: Option<Vec<String>>,
    pub name_contains: Option<String>,
    pub category_id: Option<String>,
    pub uncategorized: bool,
    pub active: Option<bool>,
    pub min_stock: Option<i32>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
}

impl Category {
    pub fn new(id: &str, name: &str) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CategoryFilter {
    pub name: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Review {
    pub id: String,
    pub product_id: String,
    pub rating: i32,
    pub body: String,
}

impl Review {
    pub fn new(id: &str, product_id: &str, rating: i32) -> Review {
        Review {
            id: id.to_string(),
            product_id: product_id.to_string(),
            rating,
            body: format!("review {id}"),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReviewFilter {
    pub min_rating: Option<i32>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct StockLevel {
    pub warehouse: String,
    pub sku: String,
    pub quantity: i64,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Ticket {
    pub id: i64,
    pub title: String,
}

/// Same shape as [`Ticket`] with a key the document backend can generate.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Note {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductWithCategory {
    pub product: Product,
    pub category: Option<Category>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductWithReviews {
    pub product: Product,
    pub reviews: Vec<Review>,
}

/// A review with its product and that product's category.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewedProduct {
    pub review: Review,
    pub product: Option<Product>,
    pub category: Option<Category>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProductReviewFilter {
    pub product: Option<ProductFilter>,
    pub review: Option<ReviewFilter>,
}

/// The products mapper together with the registered attributes that joins
/// are declared on.
pub struct Products {
    pub mapper: Arc<EntityMapper<Product, ProductFilter>>,
    pub id: Attribute<Product, String>,
    pub category_id: Attribute<Product, Option<String>>,
}

impl Products {
    pub fn new() -> Products {
        let mut builder = EntityMapper::builder("products");

        let id = builder
            .add(Attribute::new("id", |p: &Product| p.id.clone(), |p, v| p.id = v).primary())
            .unwrap();
        let name = builder
            .add(
                Attribute::new("name", |p: &Product| p.name.clone(), |p, v| p.name = v)
                    .max_length(32),
            )
            .unwrap();
        builder
            .add(Attribute::new(
                "description",
                |p: &Product| p.description.clone(),
                |p, v| p.description = v,
            ))
            .unwrap();
        let price = builder
            .add(Attribute::new("price", |p: &Product| p.price, |p, v| p.price = v))
            .unwrap();
        let category_id = builder
            .add(Attribute::new(
                "category_id",
                |p: &Product| p.category_id.clone(),
                |p, v| p.category_id = v,
            ))
            .unwrap();
        let stock = builder
            .add(Attribute::new("stock", |p: &Product| p.stock, |p, v| p.stock = v))
            .unwrap();
        let active = builder
            .add(Attribute::new("active", |p: &Product| p.active, |p, v| p.active = v))
            .unwrap();
        builder
            .add(Attribute::new(
                "released_at",
                |p: &Product| p.released_at,
                |p, v| p.released_at = v,
            ))
            .unwrap();

        let filter_id = id.clone();
        let filter_category = category_id.clone();
        builder.filter(move |filter: &ProductFilter| {
            let mut conditions = vec![];
            if let Some(ids) = &filter.ids {
                conditions.push(filter_id.is_in(ids.iter().cloned()));
            }
            if let Some(needle) = &filter.name_contains {
                conditions.push(name.contains(needle.as_str()));
            }
            if let Some(category_id) = &filter.category_id {
                conditions.push(filter_category.eq(Some(category_id.clone())));
            }
            if filter.uncategorized {
                conditions.push(filter_category.is_null());
            }
            if let Some(flag) = filter.active {
                conditions.push(active.eq(flag));
            }
            if let Some(min) = filter.min_stock {
                conditions.push(stock.gte(min));
            }
            if let Some(min) = filter.min_price {
                conditions.push(price.gt(min));
            }
            if let Some(max) = filter.max_price {
                conditions.push(price.lte(max));
            }
            conditions
        });

        Products {
            mapper: Arc::new(builder.build().unwrap()),
            id,
            category_id,
        }
    }

    pub fn repository(&self, db: &Db) -> Repository<Product, String, ProductFilter> {
        Repository::new(db.clone(), self.mapper.clone())
    }
}

impl Default for Products {
    fn default() -> Self {
        Products::new()
    }
}

pub struct Categories {
    pub mapper: Arc<EntityMapper<Category, CategoryFilter>>,
    pub id: Attribute<Category, String>,
    pub name: Attribute<Category, String>,
}

impl Categories {
    pub fn new() -> Categories {
        let mut builder = EntityMapper::builder("categories");

        let id = builder
            .add(Attribute::new("id", |c: &Category| c.id.clone(), |c, v| c.id = v).primary())
            .unwrap();
        let name = builder
            .add(Attribute::new("name", |c: &Category| c.name.clone(), |c, v| c.name = v))
            .unwrap();

        let filter_name = name.clone();
        builder.filter(move |filter: &CategoryFilter| {
            filter
                .name
                .iter()
                .map(|name| filter_name.eq(name.clone()))
                .collect()
        });

        Categories {
            mapper: Arc::new(builder.build().unwrap()),
            id,
            name,
        }
    }

    pub fn repository(&self, db: &Db) -> Repository<Category, String, CategoryFilter> {
        Repository::new(db.clone(), self.mapper.clone())
    }
}

impl Default for Categories {
    fn default() -> Self {
        Categories::new()
    }
}

pub struct Reviews {
    pub mapper: Arc<EntityMapper<Review, ReviewFilter>>,
    pub product_id: Attribute<Review, String>,
}

impl Reviews {
    pub fn new() -> Reviews {
        let mut builder = EntityMapper::builder("reviews");

        builder
            .add(Attribute::new("id", |r: &Review| r.id.clone(), |r, v| r.id = v).primary())
            .unwrap();
        let product_id = builder
            .add(Attribute::new(
                "product_id",
                |r: &Review| r.product_id.clone(),
                |r, v| r.product_id = v,
            ))
            .unwrap();
        let rating = builder
            .add(Attribute::new("rating", |r: &Review| r.rating, |r, v| r.rating = v))
            .unwrap();
        builder
            .add(Attribute::new("body", |r: &Review| r.body.clone(), |r, v| r.body = v))
            .unwrap();

        builder.filter(move |filter: &ReviewFilter| {
            filter.min_rating.iter().map(|min| rating.gte(*min)).collect()
        });

        Reviews {
            mapper: Arc::new(builder.build().unwrap()),
            product_id,
        }
    }

    pub fn repository(&self, db: &Db) -> Repository<Review, String, ReviewFilter> {
        Repository::new(db.clone(), self.mapper.clone())
    }
}

impl Default for Reviews {
    fn default() -> Self {
        Reviews::new()
    }
}

pub fn stock_levels() -> EntityMapper<StockLevel, ()> {
    let mut builder = EntityMapper::builder("stock_levels");
    builder
        .add(
            Attribute::new(
                "warehouse",
                |s: &StockLevel| s.warehouse.clone(),
                |s, v| s.warehouse = v,
            )
            .primary(),
        )
        .unwrap();
    builder
        .add(Attribute::new("sku", |s: &StockLevel| s.sku.clone(), |s, v| s.sku = v).primary())
        .unwrap();
    builder
        .add(Attribute::new(
            "quantity",
            |s: &StockLevel| s.quantity,
            |s, v| s.quantity = v,
        ))
        .unwrap();
    builder.build().unwrap()
}

pub fn tickets() -> EntityMapper<Ticket, ()> {
    let mut builder = EntityMapper::builder("tickets");
    builder
        .add(Attribute::new("id", |t: &Ticket| t.id, |t, v| t.id = v).primary())
        .unwrap();
    builder
        .add(Attribute::new("title", |t: &Ticket| t.title.clone(), |t, v| t.title = v))
        .unwrap();
    builder.build().unwrap()
}

pub fn notes() -> EntityMapper<Note, ()> {
    let mut builder = EntityMapper::builder("notes");
    builder
        .add(Attribute::new("id", |n: &Note| n.id.clone(), |n, v| n.id = v).primary())
        .unwrap();
    builder
        .add(Attribute::new("title", |n: &Note| n.title.clone(), |n, v| n.title = v))
        .unwrap();
    builder.build().unwrap()
}

/// Every product with its category, if any.
pub fn product_categories(
    db: &Db,
    kind: JoinKind,
    extra: Option<Condition>,
) -> JoinRepository<ProductWithCategory, ProductFilter> {
    let products = Products::new();
    let categories = Categories::new();

    let mut builder = JoinEntityMapper::builder(products.mapper.clone(), categories.mapper.clone())
        .on(&products.category_id, &categories.id.clone().cast(Some, Option::unwrap_or_default))
        .kind(kind)
        .compose_entity(|product, category| ProductWithCategory { product, category })
        .decompose_filter(|filter: &ProductFilter| (Some(filter.clone()), None::<CategoryFilter>));

    if let Some(extra) = extra {
        builder = builder.on_condition(extra);
    }

    JoinRepository::new(db.clone(), builder.build().unwrap())
}

/// Every review of an existing product, with the product's category if any.
/// The reviews-products join is the first side of the categories join.
pub fn reviewed_products(db: &Db) -> JoinRepository<ReviewedProduct, ReviewFilter> {
    let reviews = Reviews::new();
    let products = Products::new();
    let categories = Categories::new();

    let reviewed = JoinEntityMapper::builder(reviews.mapper.clone(), products.mapper.clone())
        .on(&reviews.product_id, &products.id)
        .kind(JoinKind::Inner)
        .compose_entity(|review, product| (review, product))
        .decompose_filter(|filter: &ReviewFilter| (Some(filter.clone()), None::<ProductFilter>))
        .build()
        .unwrap();

    let mapper = JoinEntityMapper::builder(reviewed, categories.mapper.clone())
        .on(&products.category_id, &categories.id.clone().cast(Some, Option::unwrap_or_default))
        .kind(JoinKind::Left)
        .compose_entity(|(review, product): (Review, Option<Product>), category| {
            ReviewedProduct {
                review,
                product,
                category,
            }
        })
        .decompose_filter(|filter: &ReviewFilter| (Some(filter.clone()), None::<CategoryFilter>))
        .build()
        .unwrap();

    JoinRepository::new(db.clone(), mapper)
}

/// Every product with all of its reviews.
pub fn product_reviews(db: &Db) -> JoinRepository<ProductWithReviews, ProductReviewFilter> {
    let products = Products::new();
    let reviews = Reviews::new();

    let mapper = JoinEntityMapper::builder(products.mapper.clone(), reviews.mapper.clone())
        .on(&products.id, &reviews.product_id)
        .kind(JoinKind::Left)
        .compose_entity_with_many(|product, reviews| ProductWithReviews { product, reviews })
        .decompose_filter(|filter: &ProductReviewFilter| {
            (filter.product.clone(), filter.review.clone())
        })
        .build()
        .unwrap();

    JoinRepository::new(db.clone(), mapper)
}
