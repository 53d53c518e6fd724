include!("tests_setup.rs");

use futures::Future;
use tokio_core::reactor::Core;

#[test]
fn test_toggle_favorite() {
    let mut core = Core::new().unwrap();
    let documents = create_documents_repo();
    let service = create_card_service(Some(MOCK_USER_ID), documents.clone(), "toggle-favorite");
    let product = create_products().remove(0);

    assert_eq!(core.run(service.toggle_favorite(&product.id)).unwrap(), true);
    assert!(service.card(&product).is_favorite);
    let stored = core.run(documents.get("users/shopper-1/favorites/1")).unwrap();
    assert!(stored.is_some());

    assert_eq!(core.run(service.toggle_favorite(&product.id)).unwrap(), false);
    assert!(!service.card(&product).is_favorite);
    let stored = core.run(documents.get("users/shopper-1/favorites/1")).unwrap();
    assert!(stored.is_none());
}

#[test]
fn test_cart_quantity_grows_and_resets() {
    let mut core = Core::new().unwrap();
    let service = create_card_service(Some(MOCK_USER_ID), create_documents_repo(), "cart-quantity");
    let product = create_products().remove(1);

    assert_eq!(core.run(service.add_to_cart(&product.id)).unwrap(), 1);
    assert_eq!(core.run(service.add_to_cart(&product.id)).unwrap(), 2);
    assert_eq!(service.card(&product).cart_quantity, 2);

    core.run(service.remove_from_cart(&product.id)).unwrap();
    assert_eq!(service.card(&product).cart_quantity, 0);
}

#[test]
fn test_changes_are_published() {
    let mut core = Core::new().unwrap();
    let service = create_card_service(Some(MOCK_USER_ID), create_documents_repo(), "published");
    let seen = Rc::new(RefCell::new(vec![]));
    let _subscription = {
        let seen = seen.clone();
        service
            .store_state()
            .cart
            .subscribe(move |cart| seen.borrow_mut().push(cart.values().sum::<u32>()))
    };

    let product_id = ProductId::from("3");
    core.run(service.add_to_cart(&product_id)).unwrap();
    core.run(service.add_to_cart(&product_id)).unwrap();
    core.run(service.remove_from_cart(&product_id)).unwrap();
    assert_eq!(*seen.borrow(), vec![1, 2, 0]);
}

#[test]
fn test_anonymous_shopper_uses_local_storage() {
    let mut core = Core::new().unwrap();
    let documents = create_documents_repo();
    let service = create_card_service(None, documents.clone(), "anonymous");
    let product_id = ProductId::from("2");

    core.run(service.toggle_favorite(&product_id)).unwrap();
    core.run(service.add_to_cart(&product_id)).unwrap();
    let remote = core.run(documents.list("users/shopper-1/favorites")).unwrap();
    assert!(remote.is_empty());

    // a fresh service over the same device storage sees the lists
    let reopened = ProductCardServiceImpl::new(
        membership_repo_for(None, documents, reopen_local_repo("anonymous")),
        StoreState::new(),
    );
    core.run(reopened.load()).unwrap();
    let card = reopened.card(&Product::new("2", 300.0));
    assert!(card.is_favorite);
    assert_eq!(card.cart_quantity, 1);
}

#[test]
fn test_unreachable_store_leaves_markers_untouched() {
    let mut core = Core::new().unwrap();
    let service = ProductCardServiceImpl::new(Box::new(MembershipRepoMock), StoreState::new());
    let product = create_products().remove(0);

    assert!(core.run(service.load()).is_err());
    assert!(core.run(service.toggle_favorite(&product.id)).is_err());
    assert!(core.run(service.add_to_cart(&product.id)).is_err());
    let card = service.card(&product);
    assert!(!card.is_favorite);
    assert_eq!(card.cart_quantity, 0);
}

fn reopen_local_repo(name: &str) -> LocalMembershipRepo {
    let path = env::temp_dir().join(format!("storefront-test-{}-{}.json", name, process::id()));
    LocalMembershipRepo::new(path, CpuPool::new(1))
}
