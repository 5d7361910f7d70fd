use crate::http::make_boxed_error_response;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

/// Serves `/health` (always ok) and `/ready` (ok once `is_ready` returns true).
pub struct AdminService<F, E> {
    is_ready: F,
    _error: PhantomData<fn() -> E>,
}

impl<F, E> AdminService<F, E>
where
    F: Fn() -> bool,
{
    pub fn new(is_ready: F) -> Self {
        Self {
            is_ready,
            _error: PhantomData,
        }
    }

    fn respond(&self, path: &str) -> Response<BoxBody<Bytes, Infallible>> {
        let ok_body = || Full::new(Bytes::from("ok\n")).boxed();

        match path {
            "/health" => Response::new(ok_body()),
            "/ready" => match (self.is_ready)() {
                true => Response::new(ok_body()),
                false => make_boxed_error_response(StatusCode::SERVICE_UNAVAILABLE),
            },
            _ => make_boxed_error_response(StatusCode::NOT_FOUND),
        }
    }
}

impl<F, E> Service<Request<Incoming>> for AdminService<F, E>
where
    F: Fn() -> bool,
    E: Send + 'static,
{
    type Response = Response<BoxBody<Bytes, Infallible>>;
    type Error = E;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let response = self.respond(req.uri().path());
        Box::pin(async move { Ok(response) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_admin_routes() {
        let ready = Arc::new(AtomicBool::new(false));
        let ready_clone = ready.clone();
        let service: AdminService<_, std::io::Error> =
            AdminService::new(move || ready_clone.load(Ordering::Relaxed));

        assert_eq!(service.respond("/health").status(), StatusCode::OK);
        assert_eq!(
            service.respond("/ready").status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(service.respond("/unknown").status(), StatusCode::NOT_FOUND);

        ready.store(true, Ordering::Relaxed);
        assert_eq!(service.respond("/ready").status(), StatusCode::OK);
    }
}
