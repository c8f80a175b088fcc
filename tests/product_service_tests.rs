mod common;

use catalog_server::{
    domain::{
        errors::CatalogError,
        models::{Pagination, ProductFilter, ProductPatch, ProductReferences, TaxonomyKind, UpdateProductRequest},
    },
    ports::{repositories::TaxonomyRepository, services::ProductService},
};
use common::{colors, create_request, image, product_harness, video};

#[tokio::test]
async fn test_duplicate_name_is_conflict_without_writes() {
    let h = product_harness();
    h.service
        .create_product(create_request("Linen Shirt", 40.0), vec![])
        .await
        .unwrap();

    let err = h
        .service
        .create_product(create_request("Linen Shirt", 50.0), vec![image("png")])
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::Conflict { .. }));
    assert!(h.media.uploaded().is_empty());

    let page = h
        .service
        .list_products(ProductFilter::new(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn test_images_are_ranked_in_upload_order() {
    let h = product_harness();

    let details = h
        .service
        .create_product(
            create_request("Wool Coat", 120.0),
            vec![image("png"), image("jpeg"), image("gif")],
        )
        .await
        .unwrap();

    assert!(details.videos.is_empty());
    let ranks: Vec<i32> = details.images.iter().map(|i| i.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);

    let extensions: Vec<&str> = details
        .images
        .iter()
        .map(|i| i.media_id.rsplit('.').next().unwrap())
        .collect();
    assert_eq!(extensions, vec!["png", "jpeg", "gif"]);
    assert!(details.images.iter().all(|i| i.media_id.starts_with("products/")));
}

#[tokio::test]
async fn test_only_first_video_is_kept() {
    let h = product_harness();

    let details = h
        .service
        .create_product(create_request("Runway Dress", 300.0), vec![video(), video()])
        .await
        .unwrap();

    assert!(details.images.is_empty());
    assert_eq!(details.videos.len(), 1);
    assert_eq!(h.media.uploaded().len(), 1);
}

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let h = product_harness();
    let mut request = create_request("Silk Scarf", 25.0);
    request.tag = Some("Women".to_string());
    request.colors = colors(&["Red", "Blue"]);

    let created = h
        .service
        .create_product(request, vec![image("png"), image("jpeg")])
        .await
        .unwrap();
    let fetched = h.service.get_product(created.product.id).await.unwrap();

    assert_eq!(fetched, created);
    assert_eq!(fetched.product.tag.as_deref(), Some("women"));
    assert_eq!(fetched.images[0].rank, 1);
    assert_eq!(fetched.images[1].rank, 2);

    let mut names = fetched.color_names();
    names.sort();
    assert_eq!(names, vec!["Blue", "Red"]);
}

#[tokio::test]
async fn test_color_update_replaces_set_without_duplicates() {
    let h = product_harness();
    let mut request = create_request("Canvas Tote", 15.0);
    request.colors = colors(&["Amber", "Black"]);
    let created = h.service.create_product(request, vec![]).await.unwrap();

    let updated = h
        .service
        .update_product(
            created.product.id,
            UpdateProductRequest {
                patch: ProductPatch::default(),
                colors: Some(colors(&["Black", "Cyan"])),
            },
            vec![],
        )
        .await
        .unwrap();

    let mut names = updated.color_names();
    names.sort();
    assert_eq!(names, vec!["Black", "Cyan"]);

    let stored = TaxonomyRepository::list(&*h.catalog, TaxonomyKind::Color)
        .await
        .unwrap();
    let blacks = stored.iter().filter(|c| c.name == "Black").count();
    assert_eq!(blacks, 1);
}

#[tokio::test]
async fn test_image_update_reranks_and_releases_old_media_once() {
    let h = product_harness();
    let created = h
        .service
        .create_product(create_request("Denim Jacket", 90.0), vec![image("png"), image("png")])
        .await
        .unwrap();
    let old_ids: Vec<String> = created.images.iter().map(|i| i.media_id.clone()).collect();

    let updated = h
        .service
        .update_product(
            created.product.id,
            UpdateProductRequest::default(),
            vec![image("jpeg"), image("gif"), image("webp")],
        )
        .await
        .unwrap();

    let ranks: Vec<i32> = updated.images.iter().map(|i| i.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
    assert!(updated.images.iter().all(|i| !old_ids.contains(&i.media_id)));

    let deleted = h.media.deleted();
    for id in &old_ids {
        assert_eq!(deleted.iter().filter(|d| *d == id).count(), 1);
    }
    assert_eq!(deleted.len(), old_ids.len());
}

#[tokio::test]
async fn test_video_update_replaces_video_and_releases_old_media_once() {
    let h = product_harness();
    let created = h
        .service
        .create_product(create_request("Rain Coat", 120.0), vec![image("png"), video()])
        .await
        .unwrap();
    assert_eq!(created.videos.len(), 1);
    let old_video = created.videos[0].media_id.clone();

    let updated = h
        .service
        .update_product(created.product.id, UpdateProductRequest::default(), vec![video()])
        .await
        .unwrap();

    assert_eq!(updated.videos.len(), 1);
    let new_video = updated.videos[0].media_id.clone();
    assert_ne!(new_video, old_video);
    assert!(h.media.uploaded().contains(&new_video));
    assert_eq!(updated.images, created.images);

    let deleted = h.media.deleted();
    assert_eq!(deleted, vec![old_video]);

    let fetched = h.service.get_product(created.product.id).await.unwrap();
    assert_eq!(fetched.videos.len(), 1);
    assert_eq!(fetched.videos[0].media_id, new_video);
}

#[tokio::test]
async fn test_update_without_files_keeps_media() {
    let h = product_harness();
    let created = h
        .service
        .create_product(create_request("Cap", 10.0), vec![image("png")])
        .await
        .unwrap();

    let updated = h
        .service
        .update_product(
            created.product.id,
            UpdateProductRequest {
                patch: ProductPatch {
                    price: Some(0.0),
                    ..Default::default()
                },
                colors: None,
            },
            vec![],
        )
        .await
        .unwrap();

    assert_eq!(updated.product.price, 0.0);
    assert_eq!(updated.images, created.images);
    assert!(h.media.deleted().is_empty());
}

#[tokio::test]
async fn test_rename_to_existing_name_is_conflict() {
    let h = product_harness();
    h.service
        .create_product(create_request("Boots", 80.0), vec![])
        .await
        .unwrap();
    let sandals = h
        .service
        .create_product(create_request("Sandals", 30.0), vec![])
        .await
        .unwrap();

    let err = h
        .service
        .update_product(
            sandals.product.id,
            UpdateProductRequest {
                patch: ProductPatch {
                    name: Some("Boots".to_string()),
                    ..Default::default()
                },
                colors: None,
            },
            vec![image("png")],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::Conflict { .. }));
    assert!(h.media.uploaded().is_empty());
}

#[tokio::test]
async fn test_delete_removes_each_media_id_once() {
    let h = product_harness();
    let created = h
        .service
        .create_product(
            create_request("Trench", 150.0),
            vec![image("png"), image("jpeg"), video()],
        )
        .await
        .unwrap();
    let owned = created.media_ids();
    assert_eq!(owned.len(), 3);

    h.service.delete_product(created.product.id).await.unwrap();

    let mut deleted = h.media.deleted();
    deleted.sort();
    let mut expected = owned.clone();
    expected.sort();
    assert_eq!(deleted, expected);

    let err = h.service.get_product(created.product.id).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));
}

#[tokio::test]
async fn test_delete_unknown_product_is_not_found() {
    let h = product_harness();
    let err = h.service.delete_product(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));
}

#[tokio::test]
async fn test_failed_create_transaction_removes_uploaded_media() {
    let h = product_harness();
    h.repository.fail_writes();

    let err = h
        .service
        .create_product(
            create_request("Parka", 200.0),
            vec![image("png"), image("jpeg"), video()],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Internal { .. }));

    let mut uploaded = h.media.uploaded();
    let mut deleted = h.media.deleted();
    uploaded.sort();
    deleted.sort();
    assert_eq!(uploaded.len(), 3);
    assert_eq!(deleted, uploaded);
}

#[tokio::test]
async fn test_failed_update_transaction_keeps_old_media() {
    let h = product_harness();
    let created = h
        .service
        .create_product(create_request("Poncho", 60.0), vec![image("png")])
        .await
        .unwrap();
    h.repository.fail_writes();

    h.service
        .update_product(created.product.id, UpdateProductRequest::default(), vec![image("gif")])
        .await
        .unwrap_err();

    let deleted = h.media.deleted();
    assert_eq!(deleted.len(), 1);
    assert!(deleted[0].ends_with(".gif"));

    let current = h.service.get_product(created.product.id).await.unwrap();
    assert_eq!(current.images, created.images);
}

#[tokio::test]
async fn test_failed_video_upload_discards_images() {
    let h = product_harness();
    h.media.fail_videos();

    let err = h
        .service
        .create_product(create_request("Gown", 500.0), vec![image("png"), video()])
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Media { .. }));

    assert_eq!(h.media.uploaded().len(), 1);
    assert_eq!(h.media.deleted(), h.media.uploaded());

    let page = h
        .service
        .list_products(ProductFilter::new(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_second_page_of_twenty_five() {
    let h = product_harness();
    for i in 0..25 {
        h.service
            .create_product(create_request(&format!("Item {:02}", i), 10.0), vec![])
            .await
            .unwrap();
    }

    let page = h
        .service
        .list_products(
            ProductFilter::new(),
            Pagination::new(Some(2), Some(10), Pagination::DEFAULT_LIMIT).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total, 25);
    assert_eq!(page.total_pages(), 3);
    assert_eq!(page.page, 2);
}

#[tokio::test]
async fn test_price_range_is_inclusive() {
    let h = product_harness();
    for (name, price) in [("Cheap", 10.0), ("Middle", 20.0), ("Upper", 30.0), ("Luxury", 40.0)] {
        h.service
            .create_product(create_request(name, price), vec![])
            .await
            .unwrap();
    }

    let bounded = h
        .service
        .list_products(
            ProductFilter::builder().min_price(20.0).max_price(30.0).build(),
            Pagination::default(),
        )
        .await
        .unwrap();
    let mut names: Vec<String> = bounded.items.iter().map(|p| p.product.name.clone()).collect();
    names.sort();
    assert_eq!(names, vec!["Middle", "Upper"]);

    let unbounded = h
        .service
        .list_products(ProductFilter::new(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(unbounded.total, 4);
}

#[tokio::test]
async fn test_storefront_category_and_tag_filters() {
    let h = product_harness();
    let women = TaxonomyRepository::create(&*h.catalog, TaxonomyKind::Category, "Women", None)
        .await
        .unwrap();

    let mut dress = create_request("Wrap Dress", 70.0);
    dress.references = ProductReferences {
        category_id: Some(women.id),
        ..Default::default()
    };
    dress.tag = Some("Summer".to_string());
    dress.colors = colors(&["Green"]);
    h.service.create_product(dress, vec![]).await.unwrap();

    let mut skirt = create_request("Pleated Skirt", 45.0);
    skirt.references.category_id = Some(women.id);
    skirt.colors = colors(&["Navy"]);
    h.service.create_product(skirt, vec![]).await.unwrap();

    h.service
        .create_product(create_request("Oxford Shirt", 55.0), vec![])
        .await
        .unwrap();

    let storefront = Pagination::new(None, None, Pagination::STOREFRONT_LIMIT).unwrap();

    let in_category = h
        .service
        .get_by_category("women", ProductFilter::new(), storefront)
        .await
        .unwrap();
    assert_eq!(in_category.total, 2);
    assert_eq!(in_category.limit, 16);

    let green = h
        .service
        .get_by_category(
            "Women",
            ProductFilter::builder().color("green").build(),
            storefront,
        )
        .await
        .unwrap();
    assert_eq!(green.total, 1);
    assert_eq!(green.items[0].product.name, "Wrap Dress");

    let summer = h
        .service
        .get_by_tag("SUMMER", ProductFilter::new(), storefront)
        .await
        .unwrap();
    assert_eq!(summer.total, 1);

    let err = h
        .service
        .get_by_tag("  ", ProductFilter::new(), storefront)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation { .. }));
}

#[tokio::test]
async fn test_cart_products_skip_unknown_ids() {
    let h = product_harness();
    let a = h
        .service
        .create_product(create_request("Belt", 20.0), vec![])
        .await
        .unwrap();
    let b = h
        .service
        .create_product(create_request("Wallet", 35.0), vec![])
        .await
        .unwrap();

    let cart = h
        .service
        .get_cart_products(&[a.product.id, uuid::Uuid::new_v4(), b.product.id])
        .await
        .unwrap();
    assert_eq!(cart.len(), 2);

    assert!(h.service.get_cart_products(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_create_request_is_rejected_before_upload() {
    let h = product_harness();
    let mut request = create_request("", 10.0);
    request.price = None;

    let err = h
        .service
        .create_product(request, vec![image("png")])
        .await
        .unwrap_err();

    match err {
        CatalogError::Validation { fields, .. } => {
            let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
            assert!(names.contains(&"name"));
            assert!(names.contains(&"price"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(h.media.uploaded().is_empty());
}
