//! End-to-end checkout flow over in-process fakes: storage, the order
//! API, and the payment widget.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use rust_decimal::Decimal;

use dreamx_storefront::api::types::{
    CreateOrderRequest, CreateOrderResponse, DeliveryPriceRequest, DeliveryPriceResponse,
    VerifyPaymentRequest,
};
use dreamx_storefront::api::{ApiError, OrdersApi};
use dreamx_storefront::config::StorefrontConfig;
use dreamx_storefront::models::{BillingDetails, CartItem, SessionRecord, Totals};
use dreamx_storefront::services::checkout::{
    CheckoutError, CheckoutOutcome, CheckoutService, CheckoutStatus, GatewayError,
    PaymentCompletion, PaymentGateway, WidgetOptions,
};
use dreamx_storefront::services::{CartStore, SessionStore};
use dreamx_storefront::storage::MemoryStorage;

// ===== Fakes =====

#[derive(Default)]
struct RecordingOrdersApi {
    create_requests: Mutex<Vec<CreateOrderRequest>>,
    verify_requests: Mutex<Vec<VerifyPaymentRequest>>,
    fail_verification: bool,
}

#[async_trait]
impl OrdersApi for RecordingOrdersApi {
    async fn create_order(
        &self,
        _token: &str,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ApiError> {
        self.create_requests.lock().unwrap().push(request.clone());
        Ok(serde_json::from_str(r#"{"orderid":{"id":"order_abc123"}}"#).unwrap())
    }

    async fn verify_payment(
        &self,
        _token: &str,
        request: &VerifyPaymentRequest,
    ) -> Result<(), ApiError> {
        self.verify_requests.lock().unwrap().push(request.clone());
        if self.fail_verification {
            return Err(ApiError::Status {
                status: reqwest::StatusCode::BAD_REQUEST,
                body: r#"{"message":"signature mismatch"}"#.to_string(),
            });
        }
        Ok(())
    }

    async fn delivery_price(
        &self,
        _request: &DeliveryPriceRequest,
    ) -> Result<DeliveryPriceResponse, ApiError> {
        panic!("not used in these tests")
    }
}

impl RecordingOrdersApi {
    fn call_count(&self) -> usize {
        self.create_requests.lock().unwrap().len() + self.verify_requests.lock().unwrap().len()
    }
}

/// Gateway fake. Shared `Arc` handles let tests inspect what the widget
/// was opened with after the service has taken ownership of the gateway.
#[derive(Default)]
struct FakeGateway {
    opened_with: Arc<Mutex<Option<WidgetOptions>>>,
    status_probe: Arc<Mutex<Option<tokio::sync::watch::Receiver<CheckoutStatus>>>>,
    status_at_open: Arc<Mutex<Option<CheckoutStatus>>>,
    dismiss: bool,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn ensure_loaded(&self, _script_url: &str) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn open(&self, options: WidgetOptions) -> Result<PaymentCompletion, GatewayError> {
        if let Some(probe) = self.status_probe.lock().unwrap().as_ref() {
            *self.status_at_open.lock().unwrap() = Some(probe.borrow().clone());
        }
        let order_id = options.order_id.clone();
        *self.opened_with.lock().unwrap() = Some(options);
        if self.dismiss {
            return Err(GatewayError::Dismissed);
        }
        Ok(PaymentCompletion {
            payment_id: "pay_xyz".to_string(),
            order_id,
            signature: "sig".to_string(),
        })
    }
}

// ===== Fixtures =====

fn fake_jwt(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#));
    format!("{header}.{payload}.sig")
}

fn config() -> StorefrontConfig {
    StorefrontConfig {
        pay_api_url: "http://localhost:3001".parse().unwrap(),
        auth_api_url: "http://localhost:3001/api".parse().unwrap(),
        razorpay_key: "rzp_test_key".to_string(),
        checkout_script_url: "https://checkout.razorpay.com/v1/checkout.js".to_string(),
        store_name: "Dream X Store".to_string(),
        theme_color: "#3399cc".to_string(),
    }
}

fn billing() -> BillingDetails {
    BillingDetails {
        billing_customer_name: "Asha Rao".to_string(),
        billing_address: "1 MG Road".to_string(),
        billing_city: "Bengaluru".to_string(),
        billing_pincode: "560001".to_string(),
        billing_state: "KA".to_string(),
        billing_country: "India".to_string(),
        billing_email: "asha@example.com".to_string(),
        billing_phone: "9999999999".to_string(),
        pickup_location: String::new(),
    }
}

fn tee() -> CartItem {
    CartItem {
        id: "a".repeat(24),
        title: "Graphic Tee".to_string(),
        price: Decimal::new(100, 0),
        quantity: 1,
        image: Some("tee.jpg".to_string()),
        category: Some("clothing".to_string()),
        size: Some("L".to_string()),
        pickup_pincode: None,
    }
}

struct Harness {
    api: Arc<RecordingOrdersApi>,
    cart: CartStore,
    session: SessionStore,
    opened_with: Arc<Mutex<Option<WidgetOptions>>>,
    status_at_open: Arc<Mutex<Option<CheckoutStatus>>>,
    service: CheckoutService<RecordingOrdersApi, FakeGateway>,
}

fn harness(api: RecordingOrdersApi, gateway: FakeGateway) -> Harness {
    let storage = Arc::new(MemoryStorage::new());
    let session = SessionStore::new(storage.clone());
    let cart = CartStore::load(storage);
    let api = Arc::new(api);
    let opened_with = gateway.opened_with.clone();
    let status_probe = gateway.status_probe.clone();
    let status_at_open = gateway.status_at_open.clone();
    let service = CheckoutService::new(api.clone(), gateway, session.clone(), &config());
    *status_probe.lock().unwrap() = Some(service.subscribe());
    Harness {
        api,
        cart,
        session,
        opened_with,
        status_at_open,
        service,
    }
}

fn sign_in(session: &SessionStore) {
    let token = fake_jwt(Utc::now().timestamp() + 3600);
    session.login(
        &token,
        SessionRecord::for_login("asha", "asha@example.com", &token),
    );
}

// ===== Tests =====

#[tokio::test]
async fn happy_path_places_order_and_clears_cart() {
    let h = harness(RecordingOrdersApi::default(), FakeGateway::default());
    sign_in(&h.session);

    // Adding the same (id, category, size) twice merges into one line.
    h.cart.add(tee());
    h.cart.add(tee());
    assert_eq!(h.cart.items().len(), 1);
    assert_eq!(h.cart.subtotal(), Decimal::new(200, 0));

    let totals = Totals::recompute(h.cart.subtotal(), Decimal::ZERO);
    let outcome = h.service.checkout(&h.cart, &billing(), totals).await.unwrap();
    assert_eq!(outcome, CheckoutOutcome::Confirmed);
    assert_eq!(h.service.status(), CheckoutStatus::Confirmed);

    // One wire item with the merged quantity.
    let creates = h.api.create_requests.lock().unwrap();
    let request = creates.first().unwrap();
    assert_eq!(request.items.len(), 1);
    assert_eq!(request.items.first().unwrap().quantity, 2);
    assert_eq!(request.address, "1 MG Road");
    drop(creates);

    // The widget got the rupee total in minor units, as a string.
    let verifies = h.api.verify_requests.lock().unwrap();
    assert_eq!(verifies.first().unwrap().razorpay_order_id, "order_abc123");
    assert_eq!(verifies.first().unwrap().razorpay_payment_id, "pay_xyz");
    drop(verifies);

    assert!(h.cart.is_empty());
}

#[tokio::test]
async fn widget_options_carry_amount_and_prefill() {
    let gateway = FakeGateway::default();
    let h = harness(RecordingOrdersApi::default(), gateway);
    sign_in(&h.session);

    let mut line = tee();
    line.quantity = 2;
    h.cart.add(line);

    let totals = Totals::recompute(h.cart.subtotal(), Decimal::ZERO);
    h.service.checkout(&h.cart, &billing(), totals).await.unwrap();

    let guard = h.opened_with.lock().unwrap();
    let options = guard.as_ref().unwrap();
    assert_eq!(options.amount, "20000");
    assert_eq!(options.currency, "INR");
    assert_eq!(options.key, "rzp_test_key");
    assert_eq!(options.name, "Dream X Store");
    assert_eq!(options.order_id, "order_abc123");
    assert_eq!(options.prefill.email, "asha@example.com");
    assert_eq!(options.notes.address, "1 MG Road");
    assert_eq!(options.theme.color, "#3399cc");
}

#[tokio::test]
async fn missing_billing_aborts_before_any_network_call() {
    let h = harness(RecordingOrdersApi::default(), FakeGateway::default());
    sign_in(&h.session);
    h.cart.add(tee());

    let incomplete = BillingDetails {
        billing_phone: String::new(),
        ..billing()
    };
    let totals = Totals::recompute(h.cart.subtotal(), Decimal::ZERO);
    let error = h
        .service
        .checkout(&h.cart, &incomplete, totals)
        .await
        .unwrap_err();

    assert!(matches!(error, CheckoutError::MissingBillingFields(_)));
    assert_eq!(error.user_message(), "Please fill all billing details.");
    assert_eq!(h.api.call_count(), 0);
    assert_eq!(
        h.service.status(),
        CheckoutStatus::Failed("Please fill all billing details.".to_string())
    );
}

#[tokio::test]
async fn expired_token_reads_as_not_logged_in() {
    let h = harness(RecordingOrdersApi::default(), FakeGateway::default());
    let expired = fake_jwt(Utc::now().timestamp() - 60);
    h.session.login(
        &expired,
        SessionRecord::for_login("asha", "asha@example.com", &expired),
    );
    h.cart.add(tee());

    let totals = Totals::recompute(h.cart.subtotal(), Decimal::ZERO);
    let error = h
        .service
        .checkout(&h.cart, &billing(), totals)
        .await
        .unwrap_err();

    assert!(matches!(error, CheckoutError::NotLoggedIn));
    assert_eq!(h.api.call_count(), 0);
}

#[tokio::test]
async fn bad_cart_line_fails_closed() {
    let h = harness(RecordingOrdersApi::default(), FakeGateway::default());
    sign_in(&h.session);
    h.cart.add(tee());
    let mut bad = tee();
    bad.id = "not-hex".to_string();
    bad.size = Some("M".to_string());
    h.cart.add(bad);

    let totals = Totals::recompute(h.cart.subtotal(), Decimal::ZERO);
    let error = h
        .service
        .checkout(&h.cart, &billing(), totals)
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        CheckoutError::InvalidCartItems { invalid: 1, total: 2 }
    ));
    assert_eq!(h.api.call_count(), 0);
}

#[tokio::test]
async fn dismissed_widget_fails_without_clearing_cart() {
    let h = harness(
        RecordingOrdersApi::default(),
        FakeGateway {
            dismiss: true,
            ..FakeGateway::default()
        },
    );
    sign_in(&h.session);
    h.cart.add(tee());

    let totals = Totals::recompute(h.cart.subtotal(), Decimal::ZERO);
    let error = h
        .service
        .checkout(&h.cart, &billing(), totals)
        .await
        .unwrap_err();

    assert!(matches!(error, CheckoutError::Gateway(GatewayError::Dismissed)));
    assert!(!h.cart.is_empty());
    // The order was created before the widget opened; verification never ran.
    assert_eq!(h.api.create_requests.lock().unwrap().len(), 1);
    assert!(h.api.verify_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_verification_is_not_a_confirmed_order() {
    let h = harness(
        RecordingOrdersApi {
            fail_verification: true,
            ..RecordingOrdersApi::default()
        },
        FakeGateway::default(),
    );
    sign_in(&h.session);
    h.cart.add(tee());

    let totals = Totals::recompute(h.cart.subtotal(), Decimal::ZERO);
    let outcome = h.service.checkout(&h.cart, &billing(), totals).await.unwrap();

    assert_eq!(outcome, CheckoutOutcome::VerificationFailed);
    assert_eq!(h.service.status(), CheckoutStatus::VerificationFailed);
    // Not confirmed, so the cart survives for a retry.
    assert!(!h.cart.is_empty());
}

#[tokio::test]
async fn status_is_payment_pending_while_widget_is_open() {
    let h = harness(RecordingOrdersApi::default(), FakeGateway::default());
    sign_in(&h.session);
    h.cart.add(tee());

    assert_eq!(h.service.status(), CheckoutStatus::Idle);

    let totals = Totals::recompute(h.cart.subtotal(), Decimal::ZERO);
    h.service.checkout(&h.cart, &billing(), totals).await.unwrap();

    // The gateway sampled the status channel at open time: the flow was
    // pending, not confirmed, while the widget was up.
    assert_eq!(
        *h.status_at_open.lock().unwrap(),
        Some(CheckoutStatus::PaymentPending)
    );
    assert_eq!(h.service.status(), CheckoutStatus::Confirmed);
}
