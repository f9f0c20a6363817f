// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end scenarios over an in-process scripted record store.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use govee_sync::app::SmartLights;
use govee_sync::control::LightController;
use govee_sync::model::{Device, SyncedSettings};
use govee_sync::persistence::{
    BackendKind, DEVICES_KEY, DurableStore, KeyValueBackend, MemoryBackend,
};
use govee_sync::remote::{
    AccountStatus, DEVICE_RECORD_TYPE, Record, RecordSaveResult, RecordStore, device_to_record,
};
use govee_sync::store::{EventBus, LightStore, StoreEvent};
use govee_sync::sync::{SyncCoordinator, Transport};
use govee_sync::types::{Capability, CapabilitySet, Color};
use govee_sync::Error;
use parking_lot::Mutex;

// ============================================================================
// Test doubles
// ============================================================================

/// Record store with call counters and failure switches.
#[derive(Debug)]
struct ScriptedRecords {
    status: Mutex<AccountStatus>,
    devices: Mutex<Vec<Record>>,
    query_delay: Option<Duration>,
    status_delay: Option<Duration>,
    fail_saves: AtomicBool,
    availability_checks: AtomicUsize,
    device_queries: AtomicUsize,
    saves: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedRecords {
    fn available(devices: &[Device]) -> Self {
        Self {
            status: Mutex::new(AccountStatus::Available),
            devices: Mutex::new(devices.iter().map(device_to_record).collect()),
            query_delay: None,
            status_delay: None,
            fail_saves: AtomicBool::new(false),
            availability_checks: AtomicUsize::new(0),
            device_queries: AtomicUsize::new(0),
            saves: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = Some(delay);
        self
    }

    fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = Some(delay);
        self
    }

    fn checks(&self) -> usize {
        self.availability_checks.load(Ordering::SeqCst)
    }

    fn queries(&self) -> usize {
        self.device_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for ScriptedRecords {
    async fn account_status(&self) -> govee_sync::Result<AccountStatus> {
        self.availability_checks.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.status_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(*self.status.lock())
    }

    async fn query(&self, record_type: &str) -> govee_sync::Result<Vec<Record>> {
        if record_type != DEVICE_RECORD_TYPE {
            return Ok(Vec::new());
        }
        self.device_queries.fetch_add(1, Ordering::SeqCst);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.query_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        Ok(self.devices.lock().clone())
    }

    async fn save_records(&self, records: Vec<Record>) -> govee_sync::Result<Vec<RecordSaveResult>> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Error::Network("connection reset".to_string()));
        }
        Ok(records
            .into_iter()
            .map(|r| RecordSaveResult::saved(r.record_name))
            .collect())
    }
}

/// Backend whose writes always fail.
#[derive(Debug, Default)]
struct ReadOnlyBackend {
    inner: MemoryBackend,
}

#[async_trait]
impl KeyValueBackend for ReadOnlyBackend {
    async fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn set(&self, _key: &str, _value: Vec<u8>) -> io::Result<()> {
        Err(io::Error::other("disk full"))
    }

    fn describe(&self) -> String {
        "read-only".to_string()
    }
}

/// In-memory backend counting writes.
#[derive(Debug, Default)]
struct CountingBackend {
    inner: MemoryBackend,
    writes: AtomicUsize,
}

#[async_trait]
impl KeyValueBackend for CountingBackend {
    async fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> io::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }

    fn describe(&self) -> String {
        "counting".to_string()
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn full_color(id: &str) -> Device {
    Device::new(id, format!("Light {id}"), "H6008").with_capabilities(CapabilitySet::full_color())
}

fn controller_with(records: Arc<dyn RecordStore>, durable: DurableStore) -> LightController {
    let coordinator = Arc::new(SyncCoordinator::new(LightStore::new(), durable, records));
    LightController::new(coordinator, SyncedSettings::default())
}

fn offline_controller() -> LightController {
    controller_with(
        Arc::new(govee_sync::remote::OfflineRecordStore),
        DurableStore::local(),
    )
}

// ============================================================================
// Transport coordinator
// ============================================================================

mod coordinator {
    use super::*;

    #[tokio::test]
    async fn enabling_remote_twice_brings_it_up_once() {
        let records = Arc::new(ScriptedRecords::available(&[full_color("d1")]));
        let coordinator =
            SyncCoordinator::new(LightStore::new(), DurableStore::local(), records.clone());

        coordinator.enable_transport(Transport::Remote).await.unwrap();
        coordinator.enable_transport(Transport::Remote).await.unwrap();

        assert_eq!(records.checks(), 1);
        assert_eq!(records.queries(), 1);
        assert_eq!(coordinator.store().device_count(), 1);
    }

    #[tokio::test]
    async fn unavailable_account_skips_the_fetch() {
        let records = Arc::new(ScriptedRecords::available(&[full_color("d1")]));
        *records.status.lock() = AccountStatus::TemporarilyUnavailable;
        let coordinator =
            SyncCoordinator::new(LightStore::new(), DurableStore::local(), records.clone());

        coordinator.enable_transport(Transport::Remote).await.unwrap();

        assert_eq!(records.queries(), 0);
        assert!(!coordinator.status().is_connected_via_cloud);
        assert_eq!(coordinator.store().device_count(), 0);
    }

    #[tokio::test]
    async fn empty_shared_storage_connects_without_error() {
        let coordinator = SyncCoordinator::new(
            LightStore::new(),
            DurableStore::local(),
            Arc::new(govee_sync::remote::OfflineRecordStore),
        );

        coordinator
            .enable_transport(Transport::SharedStorage)
            .await
            .unwrap();

        assert!(coordinator.status().is_connected_via_shared_storage);
        assert_eq!(coordinator.store().device_count(), 0);
    }

    #[tokio::test]
    async fn corrupt_shared_storage_reports_and_stays_disconnected() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set(DEVICES_KEY, b"not json".to_vec()).await.unwrap();
        let store = LightStore::new();
        store.replace_devices(vec![full_color("keep")]);
        let coordinator = SyncCoordinator::new(
            store,
            DurableStore::with_backend(backend, BackendKind::Shared),
            Arc::new(govee_sync::remote::OfflineRecordStore),
        );

        coordinator
            .enable_transport(Transport::SharedStorage)
            .await
            .unwrap();

        let status = coordinator.status();
        assert!(!status.is_connected_via_shared_storage);
        assert!(status.status_message.starts_with("Shared storage error"));
        assert_eq!(coordinator.store().device_count(), 1);
    }

    #[tokio::test]
    async fn bluetooth_is_not_implemented() {
        let coordinator = SyncCoordinator::new(
            LightStore::new(),
            DurableStore::local(),
            Arc::new(govee_sync::remote::OfflineRecordStore),
        );

        let err = coordinator
            .enable_transport(Transport::Bluetooth)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "bluetooth transport is not implemented");
        assert!(coordinator.enabled_transports().is_empty());
    }

    #[tokio::test]
    async fn remote_failure_never_skips_the_durable_write() {
        let records = Arc::new(ScriptedRecords::available(&[]));
        records.fail_saves.store(true, Ordering::SeqCst);
        let durable = DurableStore::local();
        let coordinator =
            SyncCoordinator::new(LightStore::new(), durable.clone(), records.clone());
        coordinator.enable_transport(Transport::Remote).await.unwrap();

        coordinator
            .save_devices(&[full_color("d1")])
            .await
            .unwrap();

        assert_eq!(records.saves.load(Ordering::SeqCst), 1);
        assert_eq!(durable.load_devices().await.unwrap().len(), 1);
        assert!(coordinator.status().status_message.contains("connection reset"));
        assert!(coordinator.status().is_connected_via_cloud);
    }

    #[tokio::test(start_paused = true)]
    async fn disabling_during_bring_up_discards_the_result() {
        let records = Arc::new(
            ScriptedRecords::available(&[full_color("d1")])
                .with_status_delay(Duration::from_millis(200)),
        );
        let coordinator = Arc::new(SyncCoordinator::new(
            LightStore::new(),
            DurableStore::local(),
            records.clone(),
        ));

        let enabling = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            async move { coordinator.enable_transport(Transport::Remote).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        coordinator.disable_transport(Transport::Remote);
        enabling.await.unwrap().unwrap();

        assert!(!coordinator.is_enabled(Transport::Remote));
        assert!(!coordinator.status().is_connected_via_cloud);
        assert_eq!(coordinator.status().status_message, "Disabled remote");
        assert_eq!(records.queries(), 0);
        assert_eq!(coordinator.store().device_count(), 0);

        coordinator.save_devices(&[full_color("d2")]).await.unwrap();
        assert_eq!(records.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn connected_save_writes_durably_once() {
        let backend = Arc::new(CountingBackend::default());
        let records = Arc::new(ScriptedRecords::available(&[]));
        let coordinator = SyncCoordinator::new(
            LightStore::new(),
            DurableStore::with_backend(backend.clone(), BackendKind::Shared),
            records.clone(),
        );
        coordinator.enable_transport(Transport::Remote).await.unwrap();

        coordinator.save_devices(&[full_color("d1")]).await.unwrap();
        coordinator.save_groups(&[]).await.unwrap();

        assert_eq!(backend.writes.load(Ordering::SeqCst), 2);
        assert_eq!(records.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn durable_failure_is_not_blamed_on_the_cloud() {
        let records = Arc::new(ScriptedRecords::available(&[]));
        let coordinator = SyncCoordinator::new(
            LightStore::new(),
            DurableStore::with_backend(Arc::new(ReadOnlyBackend::default()), BackendKind::Shared),
            records.clone(),
        );
        coordinator.enable_transport(Transport::Remote).await.unwrap();
        let before = coordinator.status().status_message;

        let err = coordinator.save_devices(&[full_color("d1")]).await.unwrap_err();

        assert!(matches!(err, Error::Storage(_)), "got {err:?}");
        assert_eq!(records.saves.load(Ordering::SeqCst), 0);
        assert_eq!(coordinator.status().status_message, before);
    }

    #[tokio::test]
    async fn disconnected_remote_is_not_written() {
        let records = Arc::new(ScriptedRecords::available(&[]));
        let coordinator =
            SyncCoordinator::new(LightStore::new(), DurableStore::local(), records.clone());

        coordinator.save_devices(&[full_color("d1")]).await.unwrap();

        assert_eq!(records.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn durable_failure_is_returned() {
        let coordinator = SyncCoordinator::new(
            LightStore::new(),
            DurableStore::with_backend(Arc::new(ReadOnlyBackend::default()), BackendKind::Local),
            Arc::new(govee_sync::remote::OfflineRecordStore),
        );

        let err = coordinator.save_devices(&[full_color("d1")]).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)), "got {err:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_sync_now_calls_are_serialized() {
        let records = Arc::new(
            ScriptedRecords::available(&[full_color("d1")])
                .with_query_delay(Duration::from_millis(50)),
        );
        let coordinator =
            SyncCoordinator::new(LightStore::new(), DurableStore::local(), records.clone());
        coordinator.enable_transport(Transport::Remote).await.unwrap();

        tokio::join!(coordinator.sync_now(), coordinator.sync_now());

        assert_eq!(records.queries(), 3);
        assert_eq!(records.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn sync_now_stamps_even_when_remote_is_down() {
        let records = Arc::new(ScriptedRecords::available(&[]));
        *records.status.lock() = AccountStatus::NoAccount;
        let coordinator =
            SyncCoordinator::new(LightStore::new(), DurableStore::local(), records.clone());
        coordinator.enable_transport(Transport::Remote).await.unwrap();

        coordinator.sync_now().await;

        let status = coordinator.status();
        assert!(status.last_sync_time.is_some());
        assert!(status.status_message.starts_with("Synced at"));
        assert!(!status.is_connected_via_cloud);
    }
}

// ============================================================================
// Control facade
// ============================================================================

mod controller {
    use super::*;

    #[tokio::test]
    async fn brightness_in_range_is_stored_exactly() {
        let lights = offline_controller();
        lights.add_device(full_color("d1")).await.unwrap();

        for value in [0, 1, 50, 99, 100] {
            let device = lights.set_brightness("d1", value).await.unwrap();
            assert_eq!(i64::from(device.brightness.value()), value);
            assert_eq!(i64::from(lights.device("d1").unwrap().brightness.value()), value);
        }
    }

    #[tokio::test]
    async fn brightness_out_of_range_changes_nothing() {
        let lights = offline_controller();
        lights.add_device(full_color("d1")).await.unwrap();
        lights.set_brightness("d1", 42).await.unwrap();

        for value in [-1, 101, 255, i64::MAX] {
            let err = lights.set_brightness("d1", value).await.unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "got {err:?}");
            assert_eq!(lights.device("d1").unwrap().brightness.value(), 42);
        }
    }

    #[tokio::test]
    async fn empty_store_then_unknown_device() {
        let lights = offline_controller();
        lights
            .coordinator()
            .enable_transport(Transport::SharedStorage)
            .await
            .unwrap();
        assert!(lights.coordinator().status().is_connected_via_shared_storage);
        assert!(lights.devices().is_empty());

        let err = lights.set_power("dev1", true).await.unwrap_err();

        assert!(matches!(err, Error::DeviceNotFound(ref id) if id == "dev1"));
        assert!(lights.devices().is_empty());
    }

    #[tokio::test]
    async fn color_temperature_requires_capability() {
        let lights = offline_controller();
        let capabilities: CapabilitySet = [Capability::Color, Capability::Brightness]
            .into_iter()
            .collect();
        let device = Device::new("d1", "Strip", "H6159")
            .with_capabilities(capabilities)
            .with_brightness(govee_sync::Brightness::new(50).unwrap());
        lights.add_device(device).await.unwrap();
        let before = lights.device("d1").unwrap().color;

        let err = lights.set_color_temperature("d1", 4000).await.unwrap_err();

        assert!(err.to_string().contains("does not support color temperature"));
        assert_eq!(lights.device("d1").unwrap().color, before);
    }

    #[tokio::test]
    async fn color_temperature_overlays_rgb() {
        let lights = offline_controller();
        lights
            .add_device(full_color("d1").with_color(Color::new(10, 20, 30)))
            .await
            .unwrap();

        let device = lights.set_color_temperature("d1", 5000).await.unwrap();

        assert_eq!((device.color.red(), device.color.green(), device.color.blue()), (10, 20, 30));
        assert_eq!(device.color.temperature().map(|k| k.kelvin()), Some(5000));
    }

    #[tokio::test]
    async fn deleting_a_group_clears_back_references() {
        let lights = offline_controller();
        lights.add_device(full_color("d1")).await.unwrap();
        lights.add_device(full_color("d2")).await.unwrap();
        let group = lights.create_group("Bedroom", ["d1", "d2"]).await.unwrap();
        assert_eq!(lights.device("d1").unwrap().group_id.as_deref(), Some(group.id.as_str()));

        lights.delete_group(&group.id).await.unwrap();

        assert!(lights.device("d1").unwrap().group_id.is_none());
        assert!(lights.device("d2").unwrap().group_id.is_none());
        assert!(lights.group(&group.id).is_none());

        let stored = lights.coordinator().durable().load_groups().await.unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn group_power_skips_vanished_members() {
        let lights = offline_controller();
        lights.add_device(full_color("d1")).await.unwrap();
        lights.add_device(full_color("d2")).await.unwrap();
        let group = lights.create_group("Hall", ["d1", "d2"]).await.unwrap();
        lights.coordinator().store().remove_device("d2");

        let changed = lights.set_group_power(&group.id, true).await.unwrap();

        assert_eq!(changed, 1);
        assert!(lights.device("d1").unwrap().power_state);
    }

    #[tokio::test]
    async fn device_save_failure_keeps_in_memory_change() {
        let lights = controller_with(
            Arc::new(govee_sync::remote::OfflineRecordStore),
            DurableStore::with_backend(Arc::new(ReadOnlyBackend::default()), BackendKind::Local),
        );
        lights
            .coordinator()
            .store()
            .replace_devices(vec![full_color("d1")]);

        let device = lights.set_power("d1", true).await.unwrap();

        assert!(device.power_state);
        assert!(lights.device("d1").unwrap().power_state);
    }

    #[tokio::test]
    async fn settings_toggles_apply_even_when_save_fails() {
        let records = Arc::new(ScriptedRecords::available(&[full_color("cloud")]));
        let lights = controller_with(
            records.clone(),
            DurableStore::with_backend(Arc::new(ReadOnlyBackend::default()), BackendKind::Local),
        );
        let mut settings = SyncedSettings {
            cloud_sync_enabled: false,
            ..SyncedSettings::default()
        };
        lights.update_settings(settings.clone()).await.unwrap_err();

        settings.cloud_sync_enabled = true;
        let err = lights.update_settings(settings).await.unwrap_err();

        assert!(matches!(err, Error::Storage(_)));
        assert!(lights.coordinator().is_enabled(Transport::Remote));
        assert_eq!(records.checks(), 1);
        assert_eq!(lights.devices().len(), 1);
    }

    #[tokio::test]
    async fn disabling_cloud_in_settings_disconnects() {
        let records = Arc::new(ScriptedRecords::available(&[]));
        let lights = controller_with(records, DurableStore::local());
        lights.apply_transport_settings().await;
        assert!(lights.coordinator().status().is_connected_via_cloud);

        lights
            .update_settings(SyncedSettings {
                cloud_sync_enabled: false,
                ..SyncedSettings::default()
            })
            .await
            .unwrap();

        assert!(!lights.coordinator().status().is_connected_via_cloud);
        assert!(!lights.coordinator().is_enabled(Transport::Remote));
    }

    #[tokio::test]
    async fn mutations_publish_store_events() {
        let lights = offline_controller();
        lights.add_device(full_color("d1")).await.unwrap();
        let mut events = lights.coordinator().store().subscribe();

        lights.set_power("d1", true).await.unwrap();

        match events.recv().await.unwrap() {
            StoreEvent::DeviceChanged { device } => assert!(device.power_state),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}

// ============================================================================
// Composition root
// ============================================================================

mod app {
    use super::*;

    async fn start(records: Arc<ScriptedRecords>, interval: u32) -> SmartLights {
        let durable = DurableStore::local();
        durable
            .save_settings(&SyncedSettings {
                auto_refresh_interval: interval,
                ..SyncedSettings::default()
            })
            .await
            .unwrap();
        SmartLights::start_with(durable, records, EventBus::new())
            .await
            .unwrap()
    }

    async fn wait_for_checks(records: &ScriptedRecords, expected: usize) {
        for _ in 0..100 {
            if records.checks() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn auto_refresh_runs_on_the_interval() {
        let records = Arc::new(ScriptedRecords::available(&[full_color("d1")]));
        let app = start(records.clone(), 30).await;
        assert_eq!(records.checks(), 1);

        app.spawn_auto_refresh();
        tokio::time::sleep(Duration::from_secs(31)).await;
        wait_for_checks(&records, 2).await;

        assert_eq!(records.checks(), 2);
        assert!(app.controller().settings().last_sync_time.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_pauses_auto_refresh() {
        let records = Arc::new(ScriptedRecords::available(&[]));
        let app = start(records.clone(), 0).await;

        app.spawn_auto_refresh();
        tokio::time::sleep(Duration::from_secs(600)).await;

        assert_eq!(records.checks(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stopping_auto_refresh() {
        let records = Arc::new(ScriptedRecords::available(&[]));
        let app = start(records.clone(), 5).await;

        app.spawn_auto_refresh();
        app.stop_auto_refresh();
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(records.checks(), 1);
    }
}
