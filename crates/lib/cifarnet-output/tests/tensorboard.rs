use std::fs::{self, File};

use prost::Message;

use cifarnet_output::tensorboard::proto::event::What;
use cifarnet_output::tensorboard::proto::summary::value::Value;
use cifarnet_output::tensorboard::proto::Event;
use cifarnet_output::tensorboard::record::read_records;
use cifarnet_output::tensorboard::SummaryWriter;

fn read_events(writer: &SummaryWriter) -> Vec<Event> {
    let file = File::open(writer.file_path()).unwrap();
    read_records(file)
        .unwrap()
        .into_iter()
        .map(|record| Event::decode(record.as_slice()).unwrap())
        .collect()
}

#[test]
fn test_event_file_starts_with_version() {
    let dir = tempfile::tempdir().unwrap();
    let writer = SummaryWriter::new(dir.path().join("run")).unwrap();

    let name = writer.file_path().file_name().unwrap().to_str().unwrap().to_owned();
    assert!(name.starts_with("events.out.tfevents."));
    assert_eq!(fs::read_dir(dir.path().join("run")).unwrap().count(), 1);

    let events = read_events(&writer);
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].what,
        Some(What::FileVersion("brain.Event:2".to_string()))
    );
}

#[test]
fn test_summaries_are_readable() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer = SummaryWriter::new(dir.path()).unwrap();
    writer.add_scalar("Train/Loss", 1.5, 3).unwrap();
    writer
        .add_histogram("Train/LastLayerWeightsHistogram", &[0.0, 1.0, 2.0], 10, 3)
        .unwrap();
    writer.add_histogram("Ignored", &[], 10, 3).unwrap();
    writer
        .add_image("Dataset/Inspect input grid", &vec![0u8; 3 * 8 * 8], [3, 8, 8], 0)
        .unwrap();
    writer.flush().unwrap();

    let events = read_events(&writer);
    assert_eq!(events.len(), 4);

    let summaries: Vec<_> = events[1..]
        .iter()
        .map(|event| match &event.what {
            Some(What::Summary(summary)) => (event.step, summary.value[0].clone()),
            _ => panic!("expected a summary event"),
        })
        .collect();

    assert_eq!(summaries[0].0, 3);
    assert_eq!(summaries[0].1.tag, "Train/Loss");
    assert_eq!(summaries[0].1.value, Some(Value::SimpleValue(1.5)));

    assert_eq!(summaries[1].1.tag, "Train/LastLayerWeightsHistogram");
    match &summaries[1].1.value {
        Some(Value::Histo(histo)) => {
            assert_eq!(histo.num, 3.0);
            assert_eq!(histo.bucket.iter().sum::<f64>(), 3.0);
            assert_eq!(histo.bucket.len(), 10);
        }
        _ => panic!("expected a histogram"),
    }

    assert_eq!(summaries[2].0, 0);
    assert!(matches!(summaries[2].1.value, Some(Value::Image(_))));
}

#[test]
fn test_bad_image_is_rejected_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer = SummaryWriter::new(dir.path()).unwrap();
    assert!(writer.add_image("bad", &[1, 2, 3], [3, 8, 8], 0).is_err());
    writer.flush().unwrap();
    assert_eq!(read_events(&writer).len(), 1);
}
