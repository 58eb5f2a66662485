//! Integration tests for the catalog, checkout and cover warm-up working together

use std::{sync::Arc, time::Duration};

use testresult::TestResult;

use thinkery::{
    assistant::{
        AssistantError, CoverWarmup, MockCoverGenerator, WarmupDelays, covers::jobs_for,
    },
    cart::CartStore,
    catalog::GuideId,
    checkout::{self, CheckoutError, CustomerDetails},
    fixtures,
    receipt::Receipt,
};

#[test]
fn checkout_charges_the_quoted_total_and_empties_the_cart() -> TestResult {
    let catalog = fixtures::bundled_catalog()?;
    let mut cart = CartStore::for_catalog(&catalog);

    for id in [1, 2, 3, 4, 6] {
        cart.add(catalog.get(GuideId::new(id)).ok_or("missing guide")?.clone());
    }

    let quoted = cart.quote().clone();
    let mut quotes = cart.subscribe();

    let order = checkout::complete(
        &mut cart,
        CustomerDetails::new("Grace Hopper", "grace@navy.mil"),
    )?;

    assert!(cart.is_empty());
    assert_eq!(order.quote(), &quoted);
    assert_eq!(order.quote().total().to_minor_units(), 4000);
    assert_eq!(order.downloads().len(), 5);
    assert_eq!(
        quotes.borrow_and_update().total().to_minor_units(),
        0,
        "subscribers see the cleared cart"
    );

    let mut out = Vec::new();
    Receipt::for_order(&order).write_to(&mut out)?;
    let receipt = String::from_utf8_lossy(&out);

    assert!(receipt.contains("Dark Psychology"), "{receipt}");
    assert!(receipt.contains("Bundle Discount"), "{receipt}");

    Ok(())
}

#[test]
fn checkout_refuses_empty_cart_and_bad_details() -> TestResult {
    let catalog = fixtures::bundled_catalog()?;
    let mut cart = CartStore::for_catalog(&catalog);

    assert!(matches!(
        checkout::complete(&mut cart, CustomerDetails::new("Grace", "grace@navy.mil")),
        Err(CheckoutError::EmptyCart)
    ));

    cart.add(catalog.master().ok_or("missing master")?.clone());

    assert!(matches!(
        checkout::complete(&mut cart, CustomerDetails::new("", "grace@navy.mil")),
        Err(CheckoutError::MissingName)
    ));
    assert!(matches!(
        checkout::complete(&mut cart, CustomerDetails::new("Grace", "grace@navy")),
        Err(CheckoutError::InvalidEmail(_))
    ));
    assert_eq!(cart.len(), 1);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn warmup_fills_in_catalog_artwork_progressively() -> TestResult {
    let mut catalog = fixtures::bundled_catalog()?;
    let jobs = jobs_for(&catalog);

    assert_eq!(jobs.len(), catalog.len());

    let mut generator = MockCoverGenerator::new();

    generator
        .expect_generate_cover()
        .times(jobs.len())
        .returning(|prompt| {
            if prompt.contains("psychology,manipulation") {
                Err(AssistantError::EmptyResponse)
            } else {
                Ok(format!("data:image/jpeg;base64,{}", prompt.len()))
            }
        });

    let delays = WarmupDelays {
        success: Duration::from_millis(10),
        failure: Duration::from_millis(20),
    };

    let (mut updates, handle) =
        CoverWarmup::with_delays(Arc::new(generator), delays).spawn(jobs);

    let mut applied = 0;

    while let Some(update) = updates.recv().await {
        catalog.set_artwork(update.id, update.url)?;
        applied += 1;
    }

    let summary = handle.await?;

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.generated, applied);
    assert_eq!(summary.generated + summary.failed, catalog.len());
    assert!(!summary.cancelled);

    let with_artwork = catalog
        .iter()
        .filter(|item| item.artwork_url().is_some())
        .count();

    assert_eq!(with_artwork, applied);
    assert_eq!(jobs_for(&catalog).len(), summary.failed);

    Ok(())
}
