//! Demo walk-through of one order's life, end to end.
//!
//! Runs the full flow against in-memory stores: a customer places an order,
//! the restaurant works it, a rider claims it (and a second rider loses the
//! race), the customer watches live positions arrive, and the order lands
//! at `delivered`.
//!
//! ```bash
//! RUST_LOG=info cargo run -p delivery-server
//! ```

use delivery_core::tracing::setup_tracing;
use delivery_server::hub::LocationSample;
use delivery_server::model::{
    DeliveryAddress, OrderCreate, OrderItem, OrderStatus, PaymentMethod, RiderId, SessionId,
};
use delivery_server::system::DeliverySystem;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    info!("starting delivery system demo");
    let system = DeliverySystem::new();

    // Customer places an order.
    let order = system
        .engine
        .create(OrderCreate {
            customer_id: "cust_42".into(),
            restaurant_id: "resto_7".into(),
            items: vec![
                OrderItem {
                    item_id: "margherita".into(),
                    name: "Pizza Margherita".into(),
                    qty: 2,
                    price: 10.0,
                },
                OrderItem {
                    item_id: "cola".into(),
                    name: "Cola".into(),
                    qty: 1,
                    price: 2.5,
                },
            ],
            delivery_address: DeliveryAddress {
                latitude: 52.52,
                longitude: 13.405,
                address_text: "Alexanderplatz 1, Berlin".into(),
            },
            total_amount: Some(22.5),
            payment_method: PaymentMethod::CashOnDelivery,
        })
        .await
        .map_err(|e| e.to_string())?;
    info!(order_id = %order.id, "order placed");

    // Restaurant starts working it.
    system
        .engine
        .set_status(&order.id, OrderStatus::Preparing, None)
        .await
        .map_err(|e| e.to_string())?;

    // The customer's app joins the order's location channel before a rider
    // even exists; nothing is replayed, it just waits.
    let customer_session = SessionId::from("session_cust_42");
    let mut updates = system.hub.subscribe(customer_session, order.id);

    // Two riders race for the claim; exactly one wins.
    let rider = RiderId::from("rider_1");
    let claimed = system
        .engine
        .accept_order(&rider, &order.id)
        .await
        .map_err(|e| e.to_string())?;
    info!(rider_id = %rider, status = %claimed.status, "claim won");

    if let Err(e) = system.engine.accept_order(&"rider_2".into(), &order.id).await {
        warn!(error = %e, "second claim lost, as it should");
    }

    // Rider reports positions on the way to the restaurant and onwards.
    for (lng, lat, heading) in [(13.39, 52.51, 90.0), (13.40, 52.515, 45.0), (13.405, 52.52, 10.0)] {
        system
            .hub
            .publish(LocationSample {
                rider_id: rider.clone(),
                order_id: order.id,
                longitude: lng,
                latitude: lat,
                heading,
            })
            .await
            .map_err(|e| e.to_string())?;
    }

    while let Ok(update) = updates.try_recv() {
        info!(
            rider_id = %update.rider_id,
            lng = update.longitude,
            lat = update.latitude,
            heading = update.heading,
            "customer sees rider move"
        );
    }

    // Pickup, handover, done.
    for status in [
        OrderStatus::PickupCompleted,
        OrderStatus::DeliveryStarted,
        OrderStatus::Delivered,
    ] {
        system
            .engine
            .set_status(&order.id, status, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    let done = system.engine.order(&order.id).await.map_err(|e| e.to_string())?;
    info!(order_id = %done.id, status = %done.status, "demo finished");
    Ok(())
}
