//! Integration tests for the data module across file sources and
//! configuration files.
//!
//! These tests ensure that:
//! 1. CSV and JSON tables load into a data module
//! 2. TOML and JSON configuration files drive the split and the loaders
//! 3. Loaders cover every partition row exactly once per evaluation epoch

use std::io::Write;

use pythia_rust::learning::{
    AdvisoryKind, BaseDataModule, Batch, DataModuleConfig, DataModuleError, DataSource, Split,
    SplitConfig, Stage, ToTensor,
};
use tempfile::{Builder, NamedTempFile};

// ==================== Helper Functions ====================

fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// 60 observations: 45 quiet regions (`0`) and 15 flaring ones (`1`)
fn flare_csv() -> NamedTempFile {
    let mut content = String::from("area,magnetic_flux,flare\n");
    for i in 0..60 {
        content.push_str(&format!(
            "{},{:.1},{}\n",
            100 + i,
            i as f64 * 0.5,
            u8::from(i % 4 == 0)
        ));
    }
    write_temp(".csv", &content)
}

fn flare_json() -> NamedTempFile {
    let records: Vec<String> = (0..40)
        .map(|i| {
            format!(
                r#"{{"area": {}, "magnetic_flux": {:.1}, "flare": {}}}"#,
                100 + i,
                i as f64 * 0.5,
                u8::from(i % 4 == 0)
            )
        })
        .collect();
    write_temp(".json", &format!("[{}]", records.join(",")))
}

// ==================== File Sources ====================

#[test]
fn test_csv_source_end_to_end() {
    let csv = flare_csv();
    let config = DataModuleConfig::new("flare")
        .with_x_col(["area", "magnetic_flux"])
        .with_seed(7)
        .with_split_config(Split::Train, SplitConfig::new().with_transform(ToTensor))
        .with_split_config(Split::Val, SplitConfig::new())
        .with_split_config(Split::Test, SplitConfig::new().with_batch_size(100));

    let mut module = BaseDataModule::new(DataSource::csv(csv.path()), config).unwrap();
    module.prepare_data().unwrap();
    module.setup().unwrap();

    assert_eq!(module.stage(), Stage::SetUp);
    assert_eq!(module.data().unwrap().height(), 60);
    assert_eq!(module.labels().unwrap().num_classes(), 2);
    assert!(module.advisories().is_empty());

    let total = module.train().unwrap().len() + module.val().unwrap().len() + module.test().unwrap().len();
    assert_eq!(total, 60);
    assert_eq!(module.test().unwrap().len(), 12);

    for batch in module.train_dataloader().unwrap() {
        let Batch::Tensor(tensor) = batch.unwrap() else {
            panic!("train batches should be tensors");
        };
        assert_eq!(tensor.features.ncols(), 2);
        assert!(tensor.features.nrows() <= 4);
    }

    let mut test_loader = module.test_dataloader().unwrap();
    assert_eq!(test_loader.len(), 1);
    let Batch::Table { features, targets } = test_loader.next().unwrap().unwrap() else {
        panic!("test batches should be tables");
    };
    assert_eq!(features.height(), 12);
    assert_eq!(targets.len(), 12);
}

#[test]
fn test_json_source_infers_feature_columns() {
    let json = flare_json();
    let mut module =
        BaseDataModule::new(DataSource::json(json.path()), DataModuleConfig::new("flare")).unwrap();
    module.prepare_data().unwrap();

    assert!(module
        .advisories()
        .contains(AdvisoryKind::InferredFeatureColumns));
    let mut x_col = module.x_col().unwrap().to_vec();
    x_col.sort();
    assert_eq!(x_col, vec!["area".to_string(), "magnetic_flux".to_string()]);
}

#[test]
fn test_missing_file_is_a_load_error() {
    let mut module = BaseDataModule::new(
        DataSource::csv("/nonexistent/flares.csv"),
        DataModuleConfig::new("flare"),
    )
    .unwrap();
    let err = module.prepare_data().unwrap_err();
    assert!(matches!(err, DataModuleError::Load(_)));
    assert!(!err.is_type_error());
}

// ==================== Configuration Files ====================

#[test]
fn test_toml_config_drives_module() {
    let csv = flare_csv();
    let config_file = write_temp(
        ".toml",
        r#"
y_col = "flare"
x_col = ["area", "magnetic_flux"]
train_test_split = 0.25
train_val_split = 0.2
batch_size = 5
weighted_sampling = false
seed = 3

[train_conf]
batch_size = 9

[val_conf]
is_tabular = false

[test_conf]
shuffle = true
"#,
    );

    let config = DataModuleConfig::from_file(config_file.path()).unwrap();
    let mut module = BaseDataModule::new(DataSource::csv(csv.path()), config).unwrap();
    module.prepare_data().unwrap();
    module.setup().unwrap();

    assert_eq!(module.test().unwrap().len(), 15);
    assert_eq!(module.val().unwrap().len(), 9);
    assert_eq!(module.train().unwrap().len(), 36);
    assert!(module.advisories().is_empty());

    assert_eq!(module.train_dataloader().unwrap().batch_size(), 9);
    let mut val = module.val_dataloader().unwrap();
    assert_eq!(val.batch_size(), 5);
    assert!(matches!(val.next().unwrap().unwrap(), Batch::Rows(_)));

    let mut order = module.test_dataloader().unwrap().order().to_vec();
    order.sort_unstable();
    assert_eq!(order, (0..15).collect::<Vec<_>>());
}

#[test]
fn test_json_config_with_missing_split_confs() {
    let json = flare_json();
    let config_file = write_temp(
        ".json",
        r#"{"y_col": "flare", "x_col": ["area"], "val_conf": {"batch_size": 2}}"#,
    );

    let config = DataModuleConfig::from_file(config_file.path()).unwrap();
    let mut module = BaseDataModule::new(DataSource::json(json.path()), config).unwrap();
    module.prepare_data().unwrap();
    module.setup().unwrap();

    let advisories = module.advisories();
    assert_eq!(advisories.len(), 2);
    assert!(advisories.contains(AdvisoryKind::MissingSplitConfig(Split::Train)));
    assert!(advisories.contains(AdvisoryKind::MissingSplitConfig(Split::Test)));
    assert_eq!(module.val_dataloader().unwrap().batch_size(), 2);
}

#[test]
fn test_json_config_error_names_field() {
    let config_file = write_temp(".json", r#"{"y_col": "flare", "batch_size": "four"}"#);
    let err = DataModuleConfig::from_file(config_file.path()).unwrap_err();
    assert!(err.to_string().contains("batch_size"), "{}", err);
}

#[test]
fn test_regression_config_from_toml() {
    let config = DataModuleConfig::from_toml_str(
        r#"
y_col = "magnetic_flux"
is_regression = true
"#,
    )
    .unwrap();
    let csv = flare_csv();
    let mut module = BaseDataModule::new(DataSource::csv(csv.path()), config).unwrap();

    assert!(module
        .advisories()
        .contains(AdvisoryKind::StratifiedShuffleDisabled));
    assert!(module
        .advisories()
        .contains(AdvisoryKind::WeightedSamplingDisabled));

    module.prepare_data().unwrap();
    module.setup().unwrap();
    assert!(module.labels().is_none());
    assert_eq!(module.train_dataloader().unwrap().num_samples(), module.train().unwrap().len());
}
