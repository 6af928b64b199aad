/*
 * Test fixtures for ecfan
 *
 * Common configuration fixtures shared by the unit test modules. Tests take a
 * fixture and mutate the one or two fields they care about.
 */

use crate::config::{FanConfig, ModelConfig, TemperatureThreshold};

/// Three bands: off, 50% from 60°C, full speed from 75°C
pub fn create_test_thresholds() -> Vec<TemperatureThreshold> {
    vec![
        TemperatureThreshold::new(0.0, 0.0, 0.0),
        TemperatureThreshold::new(60.0, 48.0, 50.0),
        TemperatureThreshold::new(75.0, 65.0, 100.0),
    ]
}

/// A byte-register fan reading 0x93 and writing 0x94 over 0..=200
pub fn create_test_fan_config() -> FanConfig {
    FanConfig {
        fan_display_name: Some("CPU fan".to_string()),
        read_register: Some(0x93),
        write_register: Some(0x94),
        min_speed_value: 0,
        max_speed_value: 200,
        temperature_thresholds: create_test_thresholds(),
        ..Default::default()
    }
}

/// Byte-width model with one fan, critical above 80°C until below 70°C
pub fn create_test_model_config() -> ModelConfig {
    ModelConfig {
        notebook_model: "Test Notebook 15".to_string(),
        ec_poll_interval: 3000,
        read_write_words: false,
        critical_temperature: 80.0,
        critical_temperature_offset: 10.0,
        fan_configurations: vec![create_test_fan_config()],
    }
}
