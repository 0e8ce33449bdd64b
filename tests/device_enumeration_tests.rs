//! Device enumeration integration tests
//!
//! These tests exercise the enumeration contract against the mock backend:
//! host ordering, per-device skip-on-failure, exclusion of devices without
//! output streams, and the recoverable top-level failure path.

use playout_core::backend::mock_impl::{MockBackend, MockDevice};
use playout_core::backend::OutputBackend;
use playout_core::PlayoutError;

#[test]
fn test_enumeration_preserves_host_order() {
    let backend = MockBackend::with_devices(
        vec![
            MockDevice::new("a", "Device A"),
            MockDevice::new("b", "Device B"),
            MockDevice::new("c", "Device C"),
        ],
        "b",
    );

    let devices = backend.output_devices();
    let ids: Vec<&str> = devices.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[test]
fn test_enumeration_marks_default_device() {
    let backend = MockBackend::with_devices(
        vec![MockDevice::new("a", "Device A"), MockDevice::new("b", "Device B")],
        "b",
    );

    let devices = backend.output_devices();
    assert!(!devices[0].is_default);
    assert!(devices[1].is_default);
}

#[test]
fn test_device_failing_identifier_query_is_skipped() {
    let mut broken = MockDevice::new("broken", "Broken Device");
    broken.fail_id_query = true;
    let backend = MockBackend::with_devices(
        vec![MockDevice::new("a", "Device A"), broken, MockDevice::new("b", "Device B")],
        "a",
    );

    let devices = backend.output_devices();
    let ids: Vec<&str> = devices.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"], "the failing device is skipped, not fatal");
}

#[test]
fn test_device_failing_name_query_is_skipped() {
    let mut nameless = MockDevice::new("nameless", "Nameless");
    nameless.fail_name_query = true;
    let backend =
        MockBackend::with_devices(vec![nameless, MockDevice::new("a", "Device A")], "a");

    let devices = backend.output_devices();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].id, "a");
}

#[test]
fn test_device_without_output_streams_is_excluded() {
    let mut capture_only = MockDevice::new("mic", "Capture Only");
    capture_only.output_streams = 0;
    let backend =
        MockBackend::with_devices(vec![capture_only, MockDevice::new("a", "Device A")], "a");

    let devices = backend.output_devices();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].id, "a");
}

#[test]
fn test_top_level_enumeration_failure_yields_gathered_devices() {
    let backend = MockBackend::with_devices(
        vec![MockDevice::new("a", "Device A")],
        "a",
    );
    backend.set_fail_enumeration(true);

    // Recoverable: the caller gets whatever was gathered before the failure,
    // empty when the very first query fails.
    assert!(backend.output_devices().is_empty());

    backend.set_fail_enumeration(false);
    assert_eq!(backend.output_devices().len(), 1);
}

#[test]
fn test_default_query_fails_without_default() {
    let backend = MockBackend::new();
    assert!(matches!(
        backend.default_output_device().err(),
        Some(PlayoutError::HostOperationFailed { .. })
    ));
}

#[test]
fn test_default_query_returns_descriptor() {
    let backend = MockBackend::with_devices(
        vec![MockDevice::new("a", "Device A"), MockDevice::new("b", "Device B")],
        "b",
    );

    let info = backend.default_output_device().unwrap();
    assert_eq!(info.id, "b");
    assert_eq!(info.name, "Device B");
    assert!(info.is_default);
}
