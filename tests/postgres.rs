//! Store tests against a live database. Run with
//! `DATABASE_URL=postgres://... cargo test --test postgres -- --ignored`.

use art_marketplace::config::DatabaseConfig;
use art_marketplace::domain::aggregates::{ArtworkUpdate, NewArtwork};
use art_marketplace::store::{CartStore, CatalogStore, OrderStore, PgStore, Settled, UserStore};
use art_marketplace::{Artwork, Cart, Order, Percent, Quantity, User};
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

async fn store() -> PgStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for --ignored tests");
    let store = PgStore::connect(&DatabaseConfig { url, max_connections: 2, acquire_timeout_secs: 5 }).await.unwrap();
    store.migrate().await.unwrap();
    store
}

fn artwork(price: i64, stock: u32) -> Artwork {
    Artwork::list(
        NewArtwork {
            title: "Quay".into(), category: "Print".into(), description: "Etching".into(), artist: "R. Moss".into(),
            price: Decimal::from(price), stock, rating: Decimal::ZERO, image: "/uploads/quay.jpg".into(),
            dimensions: None, medium: None, year_created: None, in_stock: None, discount: Percent::zero(),
        },
        Uuid::new_v4(),
    )
    .unwrap()
}

#[tokio::test]
#[ignore]
async fn test_settle_is_atomic_and_idempotent() {
    let store = store().await;
    let a = artwork(100, 5);
    let b = artwork(40, 5);
    store.insert_artwork(&a).await.unwrap();
    store.insert_artwork(&b).await.unwrap();

    let user = Uuid::new_v4();
    let mut cart = Cart::for_user(user);
    cart.add_item(&a, Quantity::new(3).unwrap()).unwrap();
    store.save_cart(&cart).await.unwrap();
    let catalog = HashMap::from([(a.id, a.clone())]);
    let reference = format!("cs_it_{}", Uuid::new_v4().simple());
    let order = Order::settle(&cart.resolve(&catalog), Some(reference.clone()));

    // Lowered stock makes the settled quantity exceed it.
    let mut lowered = a.clone();
    lowered.apply(ArtworkUpdate { stock: Some(2), ..Default::default() }).unwrap();
    store.update_artwork(&lowered).await.unwrap();
    // A line added after the snapshot must survive settlement.
    cart.add_item(&b, Quantity::one()).unwrap();
    store.save_cart(&cart).await.unwrap();

    assert_eq!(store.settle(&order, &[a.id]).await.unwrap(), Settled::Placed { oversold: vec![a.id] });
    let sold = store.artwork(a.id).await.unwrap().unwrap();
    assert_eq!(sold.stock, 0);
    assert!(!sold.in_stock);
    let left = store.cart(user).await.unwrap().unwrap();
    assert_eq!(left.items().len(), 1);
    assert_eq!(left.items()[0].artwork_id, b.id);

    let again = Order::settle(&Cart::for_user(user).resolve(&catalog), Some(reference.clone()));
    assert!(matches!(store.settle(&again, &[]).await.unwrap(), Settled::Duplicate(o) if o.id() == order.id()));
    assert_eq!(store.orders_for_user(user).await.unwrap().len(), 1);
    assert_eq!(store.order_by_payment(&reference).await.unwrap().unwrap().total(), Decimal::from(300));
    assert_eq!(store.artwork(b.id).await.unwrap().unwrap().stock, 5);
}

#[tokio::test]
#[ignore]
async fn test_user_favorites_round_trip() {
    let store = store().await;
    let tag = Uuid::new_v4().simple().to_string();
    let user = User::register(&format!("u{}", &tag[..12]), &format!("{tag}@example.com"), "h".into(), None);
    assert!(store.insert_user(&user).await.unwrap());
    assert!(!store.insert_user(&user).await.unwrap());

    let artwork_id = Uuid::new_v4();
    assert!(store.toggle_favorite(user.id, artwork_id).await.unwrap());
    assert_eq!(store.favorites(user.id).await.unwrap(), vec![artwork_id]);
    assert!(!store.toggle_favorite(user.id, artwork_id).await.unwrap());

    store.toggle_favorite(user.id, artwork_id).await.unwrap();
    assert!(store.delete_user(user.id).await.unwrap());
    assert!(store.favorites(user.id).await.unwrap().is_empty());
}
