#![cfg(feature = "io-csv")]

use anyhow::Result;
use pullflow::testing::*;
use pullflow::*;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
struct Record {
    id: u32,
    name: String,
}

fn records() -> Vec<Record> {
    vec![
        Record { id: 1, name: "Alice".into() },
        Record { id: 2, name: "Bob".into() },
    ]
}

#[test]
fn csv_with_header_row() -> Result<()> {
    let mut out = Vec::new();
    let n = Csv::new(MemorySource::from_vec(records())).write_to(&mut out)?;
    assert_eq!(n, 2);
    assert_eq!(String::from_utf8(out)?, "id,name\n1,Alice\n2,Bob\n");
    Ok(())
}

#[test]
fn tab_separated_without_header() -> Result<()> {
    let opts = CsvOptions {
        separator: Separator::Tab,
        has_headers: false,
    };
    let mut out = Vec::new();
    Csv::with_options(MemorySource::from_vec(records()), opts).write_to(&mut out)?;
    assert_eq!(String::from_utf8(out)?, "1\tAlice\n2\tBob\n");
    Ok(())
}

#[test]
fn fields_needing_quotes_are_quoted() -> Result<()> {
    let rows = vec![Record { id: 9, name: "Smith, Jane".into() }];
    let mut out = Vec::new();
    Csv::new(MemorySource::from_vec(rows)).write_to(&mut out)?;
    assert_eq!(String::from_utf8(out)?, "id,name\n9,\"Smith, Jane\"\n");
    Ok(())
}

#[test]
fn csv_reads_back_through_the_source() -> Result<()> {
    let mut out = Vec::new();
    Csv::new(MemorySource::from_vec(records())).write_to(&mut out)?;
    let src = CsvSource::<_, Record>::new(out.as_slice(), &CsvOptions::default());
    assert_stream_yields(src, &records());
    Ok(())
}

#[test]
fn stream_failure_aborts_csv() {
    let src = MemorySource::with_error(records(), StreamError::msg("lost"));
    let err = Csv::new(src).write_to(&mut Vec::<u8>::new()).unwrap_err();
    assert_eq!(err.written, 2);
    assert_eq!(err.source.to_string(), "lost");
}

/// Serializes its `id`, then refuses to finish when `poisoned`.
#[derive(Clone, Debug, Default)]
struct HalfWritten {
    id: u32,
    poisoned: bool,
}

impl Serialize for HalfWritten {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        use serde::ser::{Error, SerializeStruct};
        let mut st = s.serialize_struct("HalfWritten", 2)?;
        st.serialize_field("id", &self.id)?;
        if self.poisoned {
            return Err(S::Error::custom("refused to encode"));
        }
        st.serialize_field("ok", &true)?;
        st.end()
    }
}

#[test]
fn marshal_failure_leaves_no_partial_record() {
    let items = vec![
        HalfWritten { id: 1, poisoned: false },
        HalfWritten { id: 2, poisoned: true },
    ];
    let mut out = Vec::new();
    let err = Csv::new(MemorySource::from_vec(items))
        .write_to(&mut out)
        .unwrap_err();
    assert_eq!(err.written, 1);
    assert_eq!(String::from_utf8_lossy(&out), "id,ok\n1,true\n");
}

#[test]
fn marshal_failure_on_first_record_writes_no_header() {
    let items = vec![HalfWritten { id: 1, poisoned: true }];
    let mut out = Vec::new();
    let err = Csv::new(MemorySource::from_vec(items))
        .write_to(&mut out)
        .unwrap_err();
    assert_eq!(err.written, 0);
    assert!(out.is_empty());
}
