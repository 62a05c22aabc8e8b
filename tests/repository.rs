use diesel::connection::SimpleConnection;
use marketplace_scraper::domain::listing::{NewListing, Observation};
use marketplace_scraper::domain::product::{DEFAULT_BRANDS, NewProduct};
use marketplace_scraper::domain::supplier::NewSupplier;
use marketplace_scraper::domain::types::{
    ListingUrl, Price, ProductId, ProductName, Rating, SellerId, SellerName, ShippingEta,
    ShippingPrice, SupplierCode, SupplierId, SupplierName,
};
use marketplace_scraper::repository::{
    DieselRepository, ListingHistoryQuery, ListingReader, ListingWriter, ProductReader,
    ProductWriter, RepositoryError, SellerReader, SellerWriter, SupplierReader, SupplierWriter,
};

mod common;

fn observation(supplier: &str, seller: &str, price: &str) -> Observation {
    let name = ProductName::new("Samsung Galaxy S23 128GB Preto").unwrap();
    Observation {
        supplier: NewSupplier::from_name(SupplierName::new(supplier).unwrap()).unwrap(),
        seller: SellerName::new(seller).unwrap(),
        product: NewProduct::from_name(&name, DEFAULT_BRANDS).unwrap(),
        url: ListingUrl::new("https://www.amazon.com.br/dp/B0XYZ").unwrap(),
        price: Price::parse(price).unwrap(),
        rating: Rating::parse("4.6").unwrap(),
        shipping_price: ShippingPrice::zero(),
        shipping_eta: Some(ShippingEta::new("em até 5 dias úteis").unwrap()),
    }
}

#[test]
fn repeated_observations_reuse_parents() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let first = repo
        .record_observation(&observation("Amazon", "Loja XYZ", "3999.00"))
        .unwrap();
    let second = repo
        .record_observation(&observation("Amazon", "Loja XYZ", "3899.90"))
        .unwrap();

    assert_eq!(first.product_id, second.product_id);
    assert_eq!(first.seller_id, second.seller_id);
    assert_ne!(first.id, second.id);
    assert_eq!(repo.count_products().unwrap(), 1);
    assert_eq!(repo.count_listings().unwrap(), 2);
    assert_eq!(repo.list_suppliers().unwrap().len(), 1);

    let supplier = repo
        .get_supplier_by_code(&SupplierCode::new("amazon").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(supplier.name, "Amazon");
    assert_eq!(second.price.to_string(), "3899.90");
    assert_eq!(second.shipping_price.to_string(), "0.00");
}

#[test]
fn same_product_from_two_suppliers_is_one_product() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let amazon = repo
        .record_observation(&observation("Amazon", "Amazon", "3999.00"))
        .unwrap();
    let kabum = repo
        .record_observation(&observation("KaBuM!", "KaBuM!", "3949.00"))
        .unwrap();

    assert_eq!(amazon.product_id, kabum.product_id);
    assert_ne!(amazon.supplier_id, kabum.supplier_id);
    assert_eq!(repo.count_products().unwrap(), 1);
}

#[test]
fn listing_with_unknown_parent_fails_without_persisting() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let stored = repo
        .record_observation(&observation("Amazon", "Amazon", "3999.00"))
        .unwrap();

    let orphan = |product_id: ProductId, seller_id: SellerId, supplier_id: SupplierId| NewListing {
        url: stored.url.clone(),
        price: stored.price,
        rating: stored.rating,
        shipping_price: stored.shipping_price,
        shipping_eta: None,
        product_id,
        seller_id,
        supplier_id,
    };
    let missing = 999;

    let orphans = [
        orphan(ProductId::new(missing).unwrap(), stored.seller_id, stored.supplier_id),
        orphan(stored.product_id, SellerId::new(missing).unwrap(), stored.supplier_id),
        orphan(stored.product_id, stored.seller_id, SupplierId::new(missing).unwrap()),
    ];
    for listing in &orphans {
        let err = repo.insert_listing(listing).unwrap_err();
        assert!(
            matches!(err, RepositoryError::ConstraintViolation(_)),
            "unexpected error: {err:?}"
        );
        assert_eq!(repo.count_listings().unwrap(), 1);
    }
}

#[test]
fn seller_of_another_supplier_is_rejected() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let amazon = repo
        .record_observation(&observation("Amazon", "Amazon", "3999.00"))
        .unwrap();
    let kabum = repo
        .get_or_create_supplier(
            &NewSupplier::from_name(SupplierName::new("KaBuM!").unwrap()).unwrap(),
        )
        .unwrap();

    let mismatched = NewListing {
        url: amazon.url.clone(),
        price: amazon.price,
        rating: amazon.rating,
        shipping_price: amazon.shipping_price,
        shipping_eta: None,
        product_id: amazon.product_id,
        seller_id: amazon.seller_id,
        supplier_id: kabum.id,
    };

    let err = repo.insert_listing(&mismatched).unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError(_)));
    assert_eq!(repo.count_listings().unwrap(), 1);
}

#[test]
fn seller_lookup_is_scoped_to_supplier() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let supplier = repo
        .get_or_create_supplier(
            &NewSupplier::from_name(SupplierName::new("Magalu").unwrap()).unwrap(),
        )
        .unwrap();
    let name = SellerName::new("Loja XYZ").unwrap();
    let seller = repo
        .get_or_create_seller(&marketplace_scraper::domain::seller::NewSeller {
            name: name.clone(),
            supplier_id: supplier.id,
        })
        .unwrap();

    assert_eq!(repo.get_seller(supplier.id, &name).unwrap(), Some(seller));
    assert_eq!(
        repo.get_seller(SupplierId::new(999).unwrap(), &name).unwrap(),
        None
    );

    let err = repo
        .get_or_create_seller(&marketplace_scraper::domain::seller::NewSeller {
            name,
            supplier_id: SupplierId::new(999).unwrap(),
        })
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ConstraintViolation(_)));
}

#[test]
fn product_lookup_or_create_is_idempotent() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let name = ProductName::new("Apple iPhone 15 256GB Azul").unwrap();
    let product = NewProduct::from_name(&name, DEFAULT_BRANDS).unwrap();

    let first = repo.get_or_create_product(&product).unwrap();
    let second = repo.get_or_create_product(&product).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.brand, "Apple");
    assert_eq!(repo.count_products().unwrap(), 1);
    assert_eq!(
        repo.get_product_by_code(&product.code).unwrap(),
        Some(first)
    );
}

#[test]
fn price_history_is_ordered_and_filterable_by_seller() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let a1 = repo
        .record_observation(&observation("Amazon", "Loja A", "100.00"))
        .unwrap();
    let b1 = repo
        .record_observation(&observation("Amazon", "Loja B", "95.00"))
        .unwrap();
    let a2 = repo
        .record_observation(&observation("Amazon", "Loja A", "90.00"))
        .unwrap();

    let all = repo
        .list_price_history(ListingHistoryQuery::new(a1.product_id))
        .unwrap();
    assert_eq!(
        all.iter().map(|l| l.id).collect::<Vec<_>>(),
        vec![a1.id, b1.id, a2.id]
    );

    let seller_a = repo
        .list_price_history(ListingHistoryQuery::new(a1.product_id).seller(a1.seller_id))
        .unwrap();
    assert_eq!(
        seller_a
            .iter()
            .map(|l| l.price.to_string())
            .collect::<Vec<_>>(),
        vec!["100.00", "90.00"]
    );

    let none = repo
        .list_price_history(
            ListingHistoryQuery::new(a1.product_id).seller(SellerId::new(999).unwrap()),
        )
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn listings_are_append_only() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    repo.record_observation(&observation("Amazon", "Amazon", "3999.00"))
        .unwrap();

    let mut conn = test_db.pool().get().unwrap();
    assert!(conn.batch_execute("UPDATE listings SET price = '1.00';").is_err());
    assert!(conn.batch_execute("DELETE FROM listings;").is_err());
    assert!(conn.batch_execute("UPDATE suppliers SET name = 'Other';").is_err());
    assert_eq!(repo.count_listings().unwrap(), 1);
}
