use sea_orm::{DbBackend, EntityTrait, QueryTrait};
use zing_bites_api::{
    entity::{Dishes, Restaurants},
    error::AppError,
    query::{Comparison, FieldFilter, ListQuery, Page, QueryParams},
    routes::params::Pagination,
};

fn params(pairs: &[(&str, &str)]) -> QueryParams {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn restaurant_sql(query: &ListQuery) -> String {
    query
        .apply(Restaurants::find())
        .expect("query applies")
        .build(DbBackend::Postgres)
        .to_string()
}

#[test]
fn third_page_of_ten_skips_twenty() {
    let query = ListQuery::new().paginate(&params(&[("page", "3")]), 10);
    assert_eq!(
        query.page,
        Some(Page {
            number: 3,
            size: 10,
            offset: 20
        })
    );

    let sql = restaurant_sql(&query);
    assert!(sql.contains("LIMIT 10"), "{sql}");
    assert!(sql.contains("OFFSET 20"), "{sql}");
}

#[test]
fn missing_or_invalid_page_selects_the_first() {
    for raw in [None, Some("0"), Some("-2"), Some("abc")] {
        let p = match raw {
            Some(value) => params(&[("page", value)]),
            None => QueryParams::new(),
        };
        let page = ListQuery::new().paginate(&p, 10).page.expect("page set");
        assert_eq!(page.number, 1);
        assert_eq!(page.offset, 0);
    }
}

#[test]
fn search_and_filter_commute() {
    let p = params(&[("keyword", "pizza"), ("rating[gte]", "4"), ("page", "2")]);

    let search_first = ListQuery::new().search(&p).filter(&p).unwrap();
    let filter_first = ListQuery::new().filter(&p).unwrap().search(&p);

    assert_eq!(search_first, filter_first);
    assert_eq!(search_first.keyword.as_deref(), Some("pizza"));
    assert_eq!(
        search_first.filters,
        vec![FieldFilter {
            field: "rating".into(),
            op: Comparison::Gte,
            value: "4".into(),
        }]
    );
}

#[test]
fn filter_keeps_the_keyword_predicate() {
    let p = params(&[("keyword", "pizza"), ("rating[gte]", "4")]);
    let query = ListQuery::new().search(&p).filter(&p).unwrap();

    let sql = restaurant_sql(&query);
    assert!(sql.contains("ILIKE '%pizza%'"), "{sql}");
    assert!(sql.contains(r#""rating" >="#), "{sql}");
    assert!(sql.contains(" AND "), "{sql}");
}

#[test]
fn reserved_parameters_never_become_filters() {
    let p = params(&[("keyword", "x"), ("page", "2"), ("limit", "5")]);
    let query = ListQuery::new().filter(&p).unwrap();
    assert!(query.filters.is_empty());
}

#[test]
fn blank_keyword_is_ignored() {
    let query = ListQuery::new().search(&params(&[("keyword", "   ")]));
    assert_eq!(query.keyword, None);
}

#[test]
fn malformed_filters_are_rejected() {
    for key in ["price[gte", "price]", "[gte]", "price[between]", "price[gt][lt]"] {
        let result = ListQuery::new().filter(&params(&[(key, "10")]));
        assert!(
            matches!(result, Err(AppError::BadRequest(_))),
            "{key} should be rejected"
        );
    }
}

#[test]
fn unknown_fields_and_bad_values_are_rejected_on_translation() {
    let unknown = ListQuery::new()
        .filter(&params(&[("colour", "red")]))
        .unwrap();
    assert!(matches!(
        unknown.condition::<Restaurants>(),
        Err(AppError::BadRequest(_))
    ));

    let not_a_number = ListQuery::new()
        .filter(&params(&[("price[lt]", "cheap")]))
        .unwrap();
    assert!(matches!(
        not_a_number.condition::<Dishes>(),
        Err(AppError::BadRequest(_))
    ));
}

#[test]
fn dish_price_range_translates_to_both_bounds() {
    let p = params(&[("price[gte]", "100"), ("price[lte]", "250")]);
    let query = ListQuery::new().filter(&p).unwrap();
    let sql = query
        .apply(Dishes::find())
        .unwrap()
        .build(DbBackend::Postgres)
        .to_string();
    assert!(sql.contains(r#""price" >= 100"#), "{sql}");
    assert!(sql.contains(r#""price" <= 250"#), "{sql}");
}

#[test]
fn huge_page_numbers_stay_within_bigint() {
    for raw in ["1000000000000000000", "18446744073709551615"] {
        let query = ListQuery::new().paginate(&params(&[("page", raw)]), 10);
        let page = query.page.expect("page set");
        assert!(page.number <= i64::MAX as u64, "{raw}");
        assert_eq!(page.offset, i64::MAX as u64, "{raw}");

        let sql = restaurant_sql(&query);
        assert!(sql.contains(&format!("OFFSET {}", i64::MAX)), "{sql}");
    }
}

#[test]
fn pagination_past_the_last_addressable_row_is_empty_not_an_overflow() {
    let (page, per_page, offset) = Pagination {
        page: Some(i64::MAX),
        per_page: None,
    }
    .normalize();
    assert_eq!(page, i64::MAX);
    assert_eq!(per_page, 20);
    assert_eq!(offset, i64::MAX);

    let (_, _, offset) = Pagination {
        page: Some(3),
        per_page: Some(10),
    }
    .normalize();
    assert_eq!(offset, 20);
}
