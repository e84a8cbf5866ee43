use tessera::{Attribute, EntityMapper, JoinEntityMapper, JoinKind};
use tests::prelude::*;

#[test]
fn duplicate_attribute_fails_before_any_query() {
    let mut builder = EntityMapper::<Product, ProductFilter>::builder("products");
    let id = || Attribute::new("id", |p: &Product| p.id.clone(), |p, v| p.id = v).primary();

    assert_ok!(builder.add(id()));
    assert_err!(builder.add(id()) => is_invalid_mapping);
}

#[test]
fn join_requires_condition_composer_and_filter_split() {
    let products = Products::new();
    let reviews = Reviews::new();

    let missing_on = JoinEntityMapper::builder(products.mapper.clone(), reviews.mapper.clone())
        .compose_entity_with_many(|product, reviews| ProductWithReviews { product, reviews })
        .decompose_filter(|_: &ProductFilter| (None, None::<ReviewFilter>))
        .build();
    assert_err!(missing_on => is_invalid_mapping);

    let missing_composer = JoinEntityMapper::<_, _, ProductWithReviews, _, _, _>::builder(
        products.mapper.clone(),
        reviews.mapper.clone(),
    )
    .on(&products.id, &reviews.product_id)
    .decompose_filter(|_: &ProductFilter| (None, None::<ReviewFilter>))
    .build();
    assert_err!(missing_composer => is_invalid_mapping);
}

#[test]
fn join_attributes_must_belong_to_their_side() {
    let products = Products::new();
    let reviews = Reviews::new();

    // Both attributes swapped onto the wrong side.
    let swapped = JoinEntityMapper::builder(products.mapper.clone(), reviews.mapper.clone())
        .on(&reviews.product_id, &products.id)
        .compose_entity_with_many(|product, reviews| ProductWithReviews { product, reviews })
        .decompose_filter(|_: &ProductFilter| (None, None::<ReviewFilter>))
        .build();
    assert_err!(swapped => is_invalid_mapping);
}

#[test]
fn one_to_many_joins_cannot_be_nested() {
    let products = Products::new();
    let categories = Categories::new();
    let reviews = Reviews::new();

    let with_reviews = JoinEntityMapper::builder(products.mapper.clone(), reviews.mapper.clone())
        .on(&products.id, &reviews.product_id)
        .kind(JoinKind::Left)
        .compose_entity_with_many(|product, reviews| ProductWithReviews { product, reviews })
        .decompose_filter(|_: &ProductFilter| (None, None::<ReviewFilter>))
        .build();
    let with_reviews = assert_ok!(with_reviews);

    let category_id = products
        .category_id
        .clone()
        .cast(Option::unwrap_or_default, Some);
    let nested = JoinEntityMapper::builder(with_reviews, categories.mapper.clone())
        .on(&category_id, &categories.id)
        .compose_entity(|with_reviews: ProductWithReviews, _category| with_reviews.product)
        .decompose_filter(|filter: &ProductFilter| (Some(filter.clone()), None::<CategoryFilter>))
        .build();
    assert_err!(nested => is_invalid_mapping);
}
