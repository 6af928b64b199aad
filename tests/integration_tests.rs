/*
 * Integration tests for ecfan
 *
 * These tests drive the public API against a scripted backend that records
 * every hardware access, and check the sequences a daemon poll loop produces.
 */

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use ecfan::{
    Backend, EcFanError, Fan, FanConfig, FanMode, ModelConfig, Result, SpeedOverride,
    TargetOperation, TemperatureThreshold,
};
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq)]
enum Access {
    ReadByte(u8),
    ReadWord(u8),
    WriteByte(u8, u8),
    WriteWord(u8, u16),
    Acpi(String, Option<u64>),
}

/// Backend answering reads from per-register queues
///
/// Once a register's queue runs dry its last value keeps being returned.
#[derive(Default)]
struct FakeBackend {
    reads: Mutex<HashMap<u8, VecDeque<u16>>>,
    acpi_replies: Mutex<VecDeque<Result<u64>>>,
    log: Mutex<Vec<Access>>,
}

impl FakeBackend {
    fn with_reads(register: u8, values: &[u16]) -> Self {
        let backend = Self::default();
        backend.reads.lock().insert(register, values.iter().copied().collect());
        backend
    }

    fn push_acpi_reply(&self, reply: Result<u64>) {
        self.acpi_replies.lock().push_back(reply);
    }

    fn next_read(&self, register: u8) -> u16 {
        let mut reads = self.reads.lock();
        let queue = reads.entry(register).or_default();
        if queue.len() > 1 {
            queue.pop_front().unwrap_or(0)
        } else {
            queue.front().copied().unwrap_or(0)
        }
    }

    fn next_acpi(&self) -> Result<u64> {
        self.acpi_replies.lock().pop_front().unwrap_or(Ok(0))
    }

    fn log(&self) -> Vec<Access> {
        self.log.lock().clone()
    }

    fn clear_log(&self) {
        self.log.lock().clear();
    }
}

impl Backend for FakeBackend {
    fn read_byte(&self, register: u8) -> Result<u8> {
        self.log.lock().push(Access::ReadByte(register));
        Ok(self.next_read(register) as u8)
    }

    fn read_word(&self, register: u8) -> Result<u16> {
        self.log.lock().push(Access::ReadWord(register));
        Ok(self.next_read(register))
    }

    fn write_byte(&self, register: u8, value: u8) -> Result<()> {
        self.log.lock().push(Access::WriteByte(register, value));
        Ok(())
    }

    fn write_word(&self, register: u8, value: u16) -> Result<()> {
        self.log.lock().push(Access::WriteWord(register, value));
        Ok(())
    }

    fn call_acpi_method(&self, method: &str) -> Result<u64> {
        self.log.lock().push(Access::Acpi(method.to_string(), None));
        self.next_acpi()
    }

    fn call_acpi_method_with_arg(&self, method: &str, arg: u64) -> Result<u64> {
        self.log.lock().push(Access::Acpi(method.to_string(), Some(arg)));
        self.next_acpi()
    }
}

// Test utilities
fn thresholds() -> Vec<TemperatureThreshold> {
    vec![
        TemperatureThreshold::new(0.0, 0.0, 0.0),
        TemperatureThreshold::new(50.0, 40.0, 30.0),
        TemperatureThreshold::new(65.0, 55.0, 60.0),
        TemperatureThreshold::new(75.0, 68.0, 100.0),
    ]
}

fn fan_config() -> FanConfig {
    FanConfig {
        fan_display_name: Some("System fan".to_string()),
        read_register: Some(0x2f),
        write_register: Some(0x2f),
        min_speed_value: 0,
        max_speed_value: 255,
        reset_required: true,
        fan_speed_reset_value: 0x80,
        temperature_thresholds: thresholds(),
        ..Default::default()
    }
}

fn model_config(fan: FanConfig) -> ModelConfig {
    ModelConfig {
        notebook_model: "Integration Book 14".to_string(),
        ec_poll_interval: 1000,
        read_write_words: false,
        critical_temperature: 85.0,
        critical_temperature_offset: 10.0,
        fan_configurations: vec![fan],
    }
}

fn build(fan: FanConfig, backend: &Arc<FakeBackend>) -> Fan {
    let model = model_config(fan.clone());
    model.validate().unwrap();
    Fan::new(Arc::new(fan), &model, backend.clone()).unwrap()
}

#[test]
fn test_poll_loop_sequence() {
    let backend = Arc::new(FakeBackend::with_reads(0x2f, &[0, 77, 153, 255]));
    let mut fan = build(fan_config(), &backend);

    let mut written = Vec::new();
    for temp in [45.0, 52.0, 66.0, 90.0] {
        fan.set_temperature(temp);
        fan.flush().unwrap();
        fan.refresh_current_speed().unwrap();
        written.push(fan.target_speed());
    }
    assert_eq!(written, vec![0.0, 30.0, 60.0, 100.0]);
    assert!(fan.is_critical());
    assert_eq!(fan.current_speed(), 100.0);

    let writes: Vec<Access> = backend
        .log()
        .into_iter()
        .filter(|a| matches!(a, Access::WriteByte(..)))
        .collect();
    assert_eq!(
        writes,
        vec![
            Access::WriteByte(0x2f, 0),
            Access::WriteByte(0x2f, 77),
            Access::WriteByte(0x2f, 153),
            Access::WriteByte(0x2f, 255),
        ]
    );
}

#[test]
fn test_critical_hysteresis_holds_full_speed_until_cooled() {
    let backend = Arc::new(FakeBackend::default());
    let mut fan = build(fan_config(), &backend);

    fan.set_fixed_speed(40.0).unwrap();
    let observed: Vec<(bool, f32)> = [86.0, 80.0, 76.0, 74.9, 60.0]
        .iter()
        .map(|&t| {
            fan.set_temperature(t);
            (fan.is_critical(), fan.target_speed())
        })
        .collect();

    assert_eq!(
        observed,
        vec![
            (true, 100.0),
            (true, 100.0),
            (true, 100.0),
            (false, 40.0),
            (false, 40.0),
        ]
    );
    assert_eq!(fan.requested_speed(), 40.0);
    assert_eq!(fan.mode(), FanMode::Fixed);
}

#[test]
fn test_threshold_bands_have_their_own_hysteresis() {
    let backend = Arc::new(FakeBackend::default());
    let mut fan = build(fan_config(), &backend);

    let speeds: Vec<f32> = [66.0, 60.0, 56.0, 55.0, 45.0, 40.0]
        .iter()
        .map(|&t| {
            fan.set_temperature(t);
            fan.target_speed()
        })
        .collect();
    assert_eq!(speeds, vec![60.0, 60.0, 60.0, 30.0, 30.0, 0.0]);
}

#[test]
fn test_switching_back_to_auto_uses_last_threshold() {
    let backend = Arc::new(FakeBackend::default());
    let mut fan = build(fan_config(), &backend);

    fan.set_temperature(70.0);
    fan.set_fixed_speed(10.0).unwrap();
    fan.set_temperature(30.0);
    assert_eq!(fan.target_speed(), 10.0);

    // The temperature was seen in fixed mode, so the selection already moved
    fan.set_auto_speed();
    assert_eq!(fan.target_speed(), 0.0);
}

#[test]
fn test_out_of_range_fixed_speed_is_still_applied() {
    let backend = Arc::new(FakeBackend::default());
    let mut fan = build(fan_config(), &backend);

    let err = fan.set_fixed_speed(250.0).unwrap_err();
    assert!(matches!(err, EcFanError::SpeedOutOfRange { .. }));
    fan.flush().unwrap();
    assert_eq!(backend.log(), vec![Access::WriteByte(0x2f, 255)]);
}

#[test]
fn test_glitched_readings_are_retried() {
    let mut cfg = fan_config();
    cfg.max_speed_value = 200;
    let backend = Arc::new(FakeBackend::with_reads(0x2f, &[255, 255, 100]));
    let mut fan = build(cfg, &backend);

    fan.refresh_current_speed().unwrap();
    assert_eq!(fan.current_speed(), 50.0);
    assert_eq!(backend.log(), vec![Access::ReadByte(0x2f); 3]);

    backend.clear_log();
    fan.refresh_current_speed().unwrap();
    assert_eq!(backend.log(), vec![Access::ReadByte(0x2f)]);
}

#[test]
fn test_off_sentinel_override() {
    let mut cfg = fan_config();
    cfg.min_speed_value = 60;
    cfg.max_speed_value = 240;
    cfg.fan_speed_percentage_overrides = vec![SpeedOverride {
        fan_speed_percentage: 0.0,
        fan_speed_value: 255,
        target_operation: TargetOperation::ReadWrite,
    }];
    let backend = Arc::new(FakeBackend::with_reads(0x2f, &[255]));
    let mut fan = build(cfg, &backend);

    fan.set_temperature(20.0);
    fan.flush().unwrap();
    fan.refresh_current_speed().unwrap();

    assert_eq!(fan.current_speed(), 0.0);
    let log = backend.log();
    assert_eq!(log[0], Access::WriteByte(0x2f, 255));
}

#[test]
fn test_acpi_model_with_word_reset() {
    let cfg = FanConfig {
        fan_display_name: Some("GPU fan".to_string()),
        read_acpi_method: Some("\\_SB.PCI0.LPCB.EC0.GFSP".to_string()),
        write_acpi_method: Some("\\_SB.PCI0.LPCB.EC0.SFSP".to_string()),
        reset_required: true,
        reset_acpi_method: Some("\\_SB.PCI0.LPCB.EC0.RFSP".to_string()),
        min_speed_value: 0,
        max_speed_value: 4000,
        temperature_thresholds: thresholds(),
        ..Default::default()
    };
    let mut model = model_config(cfg.clone());
    model.read_write_words = true;
    model.validate().unwrap();

    let backend = Arc::new(FakeBackend::default());
    backend.push_acpi_reply(Ok(1000));
    let mut fan = Fan::new(Arc::new(cfg), &model, backend.clone()).unwrap();

    fan.refresh_current_speed().unwrap();
    assert_eq!(fan.current_speed(), 25.0);

    fan.set_fixed_speed(50.0).unwrap();
    fan.flush().unwrap();
    fan.reset().unwrap();

    assert_eq!(
        backend.log(),
        vec![
            Access::Acpi("\\_SB.PCI0.LPCB.EC0.GFSP".to_string(), None),
            Access::Acpi("\\_SB.PCI0.LPCB.EC0.SFSP".to_string(), Some(2000)),
            Access::Acpi("\\_SB.PCI0.LPCB.EC0.RFSP".to_string(), None),
        ]
    );
}

#[test]
fn test_acpi_failure_reports_operation() {
    let mut cfg = fan_config();
    cfg.reset_acpi_method = Some("\\_SB.RST0".to_string());
    let backend = Arc::new(FakeBackend::default());
    backend.push_acpi_reply(Err(EcFanError::acpi("\\_SB.RST0", "Error: AE_NOT_FOUND")));
    let fan = build(cfg, &backend);

    match fan.reset() {
        Err(EcFanError::Context { context, source }) => {
            assert_eq!(context, "ResetAcpiMethod");
            assert!(matches!(*source, EcFanError::AcpiCall { .. }));
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_register_reset_writes_raw_value() {
    let backend = Arc::new(FakeBackend::default());
    let mut fan = build(fan_config(), &backend);

    fan.set_fixed_speed(100.0).unwrap();
    fan.reset().unwrap();
    assert_eq!(backend.log(), vec![Access::WriteByte(0x2f, 0x80)]);
}

#[test]
fn test_model_config_from_json() {
    let json = r#"{
        "NotebookModel": "HP Pavilion 15",
        "CriticalTemperature": 90,
        "FanConfigurations": [{
            "ReadRegister": 46,
            "WriteRegister": 47,
            "MinSpeedValue": 255,
            "MaxSpeedValue": 0,
            "TemperatureThresholds": [
                { "UpThreshold": 0, "DownThreshold": 0, "FanSpeed": 0 },
                { "UpThreshold": 70, "DownThreshold": 60, "FanSpeed": 100 }
            ]
        }]
    }"#;

    let model: ModelConfig = serde_json::from_str(json).unwrap();
    model.validate().unwrap();
    assert_eq!(model.ec_poll_interval, 3000);
    assert_eq!(model.critical_temperature_offset, 15.0);

    let backend = Arc::new(FakeBackend::default());
    let cfg = Arc::new(model.fan_configurations[0].clone());
    let mut fan = Fan::new(cfg, &model, backend.clone()).unwrap();
    assert_eq!(fan.speed_steps(), 255);
    assert_eq!(fan.name(), None);

    fan.set_temperature(72.0);
    fan.flush().unwrap();
    assert_eq!(backend.log(), vec![Access::WriteByte(47, 0)]);
}
