//! Secured invocations through the interceptor: run-as scoping, error
//! paths and observation output.

use std::io;
use std::sync::Arc;

use access_core::{
    AffirmativeBased, Authentication, ConfigAttribute, Error, MapSecurityMetadataSource,
    ReactiveSecurityContextHolder, RoleVoter, RunAsManagerImpl, SecurityContextHolder, SecurityInterceptor,
    TracingObservationSink,
};
use parking_lot::Mutex;

fn interceptor() -> SecurityInterceptor<str> {
    let metadata = MapSecurityMetadataSource::new()
        .with("list_orders", ConfigAttribute::list("ROLE_USER"))
        .with("refund_order", ConfigAttribute::list("ROLE_USER,RUN_AS_BILLING"));
    let manager = AffirmativeBased::<str>::new(vec![Arc::new(RoleVoter::new())]).unwrap();
    SecurityInterceptor::<str>::new(Arc::new(metadata), Arc::new(manager))
        .run_as_manager(Arc::new(RunAsManagerImpl::new("billing-key").unwrap()))
}

fn user() -> Authentication {
    Authentication::new("alice", "secret", ["ROLE_USER"])
}

#[derive(Debug)]
enum AppError {
    Security(Error),
    Refund(&'static str),
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError::Security(err)
    }
}

#[test]
fn run_as_is_visible_inside_target() {
    SecurityContextHolder::set_authentication(user());

    let authorities = interceptor()
        .invoke("refund_order", || {
            let current = SecurityContextHolder::authentication().unwrap();
            Ok::<_, AppError>(
                current
                    .authorities()
                    .iter()
                    .map(|a| a.authority().to_string())
                    .collect::<Vec<_>>(),
            )
        })
        .unwrap();

    assert_eq!(authorities, ["ROLE_RUN_AS_BILLING", "ROLE_USER"]);
    assert_eq!(SecurityContextHolder::authentication(), Some(user()));
    SecurityContextHolder::clear_context();
}

#[test]
fn original_context_restored_when_target_fails() {
    SecurityContextHolder::set_authentication(user());

    let result = interceptor().invoke("refund_order", || -> Result<(), AppError> {
        assert!(SecurityContextHolder::authentication().unwrap().is_run_as());
        Err(AppError::Refund("payment gateway rejected refund"))
    });

    assert!(matches!(result, Err(AppError::Refund(_))));
    assert_eq!(SecurityContextHolder::authentication(), Some(user()));
    SecurityContextHolder::clear_context();
}

#[test]
fn original_context_restored_when_target_panics() {
    SecurityContextHolder::set_authentication(user());
    let interceptor = interceptor();

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = interceptor.invoke("refund_order", || -> Result<(), AppError> { panic!("target blew up") });
    }));

    assert!(outcome.is_err());
    assert_eq!(SecurityContextHolder::authentication(), Some(user()));
    SecurityContextHolder::clear_context();
}

#[test]
fn denial_reaches_caller_through_error_conversion() {
    SecurityContextHolder::set_authentication(Authentication::new("mallory", "pw", ["ROLE_GUEST"]));

    let mut ran = false;
    let result = interceptor().invoke("list_orders", || {
        ran = true;
        Ok::<_, AppError>(())
    });

    assert!(matches!(result, Err(AppError::Security(Error::AccessDenied(_)))));
    assert!(!ran);
    SecurityContextHolder::clear_context();
}

#[test]
fn missing_authentication_is_not_a_denial() {
    SecurityContextHolder::clear_context();
    let result = interceptor().invoke("list_orders", || Ok::<_, Error>(()));
    assert!(matches!(result, Err(Error::AuthenticationCredentialsNotFound(_))));
}

#[tokio::test]
async fn async_run_as_is_scoped_to_target() {
    let interceptor = interceptor();

    let (inside, after) = ReactiveSecurityContextHolder::with_authentication(user(), async {
        let inside = interceptor
            .invoke_async("refund_order", async {
                Ok::<_, Error>(ReactiveSecurityContextHolder::authentication().map(|a| a.is_run_as()))
            })
            .await
            .unwrap();
        let after = ReactiveSecurityContextHolder::authentication().map(|a| a.is_run_as());
        (inside, after)
    })
    .await;

    assert_eq!(inside, Some(true));
    assert_eq!(after, Some(false));
}

#[tokio::test]
async fn async_failure_keeps_caller_identity() {
    let interceptor = interceptor();

    let after = ReactiveSecurityContextHolder::with_authentication(user(), async {
        let result = interceptor
            .invoke_async("refund_order", async { Err::<(), _>(AppError::Refund("declined")) })
            .await;
        assert!(result.is_err());
        ReactiveSecurityContextHolder::authentication()
    })
    .await;

    assert_eq!(after, Some(user()));
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn tracing_sink_logs_decisions_without_credentials() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();

    let interceptor = interceptor().observation_sink(Arc::new(TracingObservationSink));
    tracing::subscriber::with_default(subscriber, || {
        interceptor.authorize("list_orders", Some(&user())).unwrap();
    });

    let output = String::from_utf8(logs.0.lock().clone()).unwrap();
    assert!(output.contains("authorization decision"));
    assert!(output.contains("list_orders"));
    assert!(output.contains("granted"));
    assert!(!output.contains("secret"));
}
