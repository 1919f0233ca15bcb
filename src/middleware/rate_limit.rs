use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

const WINDOW: Duration = Duration::from_secs(1);

/// Per-process request budget over a fixed one-second window, shared by
/// every route in the group it is layered on. Coarse on purpose: the
/// public and authenticated groups each get their own budget.
#[derive(Clone, Debug)]
pub struct Throttle {
    inner: Arc<Mutex<Window>>,
}

#[derive(Debug)]
struct Window {
    budget: u32,
    remaining: u32,
    resets_at: Instant,
}

impl Throttle {
    pub fn per_second(budget: u32) -> Self {
        let budget = budget.max(1);
        Self {
            inner: Arc::new(Mutex::new(Window {
                budget,
                remaining: budget,
                resets_at: Instant::now() + WINDOW,
            })),
        }
    }

    fn try_acquire(&self) -> bool {
        let mut window = self.inner.lock().expect("throttle mutex poisoned");
        let now = Instant::now();
        if now >= window.resets_at {
            window.remaining = window.budget;
            window.resets_at = now + WINDOW;
        }
        if window.remaining == 0 {
            return false;
        }
        window.remaining -= 1;
        true
    }
}

pub async fn throttle(
    State(limiter): State<Throttle>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !limiter.try_acquire() {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "too_many_requests" })),
        )
            .into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_exhausts_within_a_window() {
        let throttle = Throttle::per_second(2);
        assert!(throttle.try_acquire());
        assert!(throttle.try_acquire());
        assert!(!throttle.try_acquire());
    }

    #[test]
    fn budget_refills_after_the_window() {
        let throttle = Throttle::per_second(1);
        assert!(throttle.try_acquire());
        assert!(!throttle.try_acquire());
        throttle.inner.lock().unwrap().resets_at = Instant::now() - Duration::from_millis(1);
        assert!(throttle.try_acquire());
    }
}
