use std::fs;

use cifarnet_data::binary::{parse_records, RECORD_BYTES};
use cifarnet_data::{CifarDataset, DataError, DataSource, Split};
use cifarnet_testutils::images::{binary_records, make_dataset};

#[test]
fn test_parse_records_restores_items() {
    let dataset = make_dataset(4, 3);
    let bytes = binary_records(&dataset.images);
    assert_eq!(bytes.len(), 4 * RECORD_BYTES);

    let parsed = parse_records(&bytes).unwrap();
    assert_eq!(parsed, dataset.images);
}

#[test]
fn test_truncated_batch_is_rejected() {
    let dataset = make_dataset(2, 3);
    let mut bytes = binary_records(&dataset.images);
    bytes.pop();
    assert!(matches!(
        parse_records(&bytes),
        Err(DataError::MalformedBatch { .. })
    ));
}

#[test]
fn test_bad_label_is_rejected() {
    let dataset = make_dataset(1, 3);
    let mut bytes = binary_records(&dataset.images);
    bytes[0] = 42;
    assert!(matches!(
        parse_records(&bytes),
        Err(DataError::InvalidLabel(42))
    ));
}

#[test]
fn test_load_split_from_extracted_directory() {
    let root = tempfile::tempdir().unwrap();
    let batch_dir = root.path().join("cifar-10-batches-bin");
    fs::create_dir_all(&batch_dir).unwrap();

    let train = make_dataset(6, 1);
    let test = make_dataset(3, 2);
    fs::write(batch_dir.join("data_batch_1.bin"), binary_records(&train.images[..4])).unwrap();
    fs::write(batch_dir.join("data_batch_2.bin"), binary_records(&train.images[4..])).unwrap();
    for idx in 3..=5 {
        fs::write(batch_dir.join(format!("data_batch_{idx}.bin")), b"").unwrap();
    }
    fs::write(batch_dir.join("test_batch.bin"), binary_records(&test.images)).unwrap();

    let source = DataSource::Binary {
        dir: root.path().to_path_buf(),
    };
    let loaded_train = CifarDataset::load(&source, Split::Train).unwrap();
    let loaded_test = CifarDataset::load(&source, Split::Test).unwrap();
    assert_eq!(loaded_train.images, train.images);
    assert_eq!(loaded_test.images, test.images);
}

#[test]
fn test_missing_batches_are_reported() {
    let root = tempfile::tempdir().unwrap();
    let source = DataSource::Binary {
        dir: root.path().to_path_buf(),
    };
    assert!(matches!(
        CifarDataset::load(&source, Split::Test),
        Err(DataError::MissingBatches(_))
    ));
}

#[test]
fn test_partial_train_split_is_rejected() {
    let root = tempfile::tempdir().unwrap();
    let train = make_dataset(10, 1);
    for idx in [1, 2, 4, 5] {
        fs::write(
            root.path().join(format!("data_batch_{idx}.bin")),
            binary_records(&train.images),
        )
        .unwrap();
    }

    let source = DataSource::Binary {
        dir: root.path().to_path_buf(),
    };
    match CifarDataset::load(&source, Split::Train) {
        Err(DataError::MissingBatches(path)) => {
            assert_eq!(path, root.path().join("data_batch_3.bin"));
        }
        other => panic!("expected a missing batch error, got {:?}", other.map(|d| d.images.len())),
    }
}
