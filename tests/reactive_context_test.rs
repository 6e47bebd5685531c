//! Task-scoped contexts under real concurrency.

use std::time::Duration;

use access_core::{Authentication, ReactiveSecurityContextHolder, SecurityContext};

fn user(name: &str) -> Authentication {
    Authentication::new(name, "password", ["ROLE_USER"])
}

async fn name_after_yielding() -> Option<String> {
    tokio::time::sleep(Duration::from_millis(5)).await;
    tokio::task::yield_now().await;
    ReactiveSecurityContextHolder::authentication().map(|a| a.name().to_string())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_tasks_never_observe_each_others_context() {
    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let name = format!("user-{}", i);
            tokio::spawn(ReactiveSecurityContextHolder::with_authentication(user(&name), async move {
                let seen = name_after_yielding().await;
                (name, seen)
            }))
        })
        .collect();

    for task in tasks {
        let (expected, seen) = task.await.unwrap();
        assert_eq!(seen.as_deref(), Some(expected.as_str()));
    }
}

#[tokio::test]
async fn sibling_futures_on_one_task_are_isolated() {
    let (a, b) = tokio::join!(
        ReactiveSecurityContextHolder::with_authentication(user("a"), name_after_yielding()),
        ReactiveSecurityContextHolder::with_authentication(user("b"), name_after_yielding()),
    );
    assert_eq!(a.as_deref(), Some("a"));
    assert_eq!(b.as_deref(), Some("b"));
}

#[tokio::test]
async fn nested_scope_shadows_then_restores() {
    let (inner, outer) = ReactiveSecurityContextHolder::with_authentication(user("outer"), async {
        let inner = ReactiveSecurityContextHolder::with_authentication(user("inner"), name_after_yielding()).await;
        (inner, name_after_yielding().await)
    })
    .await;

    assert_eq!(inner.as_deref(), Some("inner"));
    assert_eq!(outer.as_deref(), Some("outer"));
}

#[tokio::test]
async fn empty_context_is_distinct_from_no_context() {
    let context = ReactiveSecurityContextHolder::with_context(SecurityContext::empty(), async {
        ReactiveSecurityContextHolder::get_context()
    })
    .await;

    assert_eq!(context, Some(SecurityContext::empty()));
    assert!(ReactiveSecurityContextHolder::get_context().is_none());
}
