use std::sync::Arc;

use futures::FutureExt;
use locbridge_permission::{
    DEFAULT_REQUEST_CODE, GatewayState, MemoryPermissions, Permission, PermissionGateway,
    PermissionStatus,
};

fn shared_gateway() -> Arc<PermissionGateway<MemoryPermissions>> {
    Arc::new(PermissionGateway::new(MemoryPermissions::new()))
}

#[tokio::test]
async fn grant_delivered_from_another_task_resolves_waiting_caller() {
    let gateway = shared_gateway();
    let request = gateway.request_grant(Permission::FineLocation).unwrap();

    let responder = Arc::clone(&gateway);
    tokio::spawn(async move {
        responder
            .backend()
            .set_status(Permission::FineLocation, PermissionStatus::Granted);
        responder.on_permission_result(DEFAULT_REQUEST_CODE, &[PermissionStatus::Granted]);
    });

    assert!(request.await);
    assert_eq!(gateway.state(), GatewayState::Idle);
    assert!(gateway.check_granted(Permission::FineLocation));
}

#[tokio::test]
async fn denial_resolves_false() {
    let gateway = shared_gateway();
    let request = gateway.request_grant(Permission::FineLocation).unwrap();

    gateway.on_permission_result(DEFAULT_REQUEST_CODE, &[PermissionStatus::Denied]);

    assert!(!request.await);
}

#[test]
fn second_request_silently_drops_the_first_caller() {
    let gateway = shared_gateway();
    let mut first = gateway.request_grant(Permission::FineLocation).unwrap();
    let second = gateway.request_grant(Permission::FineLocation).unwrap();

    assert_eq!(gateway.backend().prompts().len(), 2);
    assert!(gateway.on_permission_result(DEFAULT_REQUEST_CODE, &[PermissionStatus::Granted]));

    assert_eq!(second.now_or_never(), Some(true));
    assert_eq!((&mut first).now_or_never(), None);

    // A later answer does not reach the dropped caller either.
    assert!(!gateway.on_permission_result(DEFAULT_REQUEST_CODE, &[PermissionStatus::Granted]));
    assert_eq!(first.now_or_never(), None);
}

#[test]
fn gateway_cycles_back_to_idle_between_requests() {
    let gateway = shared_gateway();

    for answer in [PermissionStatus::Denied, PermissionStatus::Granted] {
        let request = gateway.request_grant(Permission::FineLocation).unwrap();
        assert_eq!(gateway.state(), GatewayState::AwaitingUserDecision);
        gateway.on_permission_result(DEFAULT_REQUEST_CODE, &[answer]);
        assert_eq!(request.now_or_never(), Some(answer.is_granted()));
        assert_eq!(gateway.state(), GatewayState::Idle);
    }
}
