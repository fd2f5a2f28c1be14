use anyhow::Result;
use pullflow::testing::*;
use pullflow::*;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn reduce_sums() -> Result<()> {
    let sum = reduce(&mut MemorySource::from_vec(vec![1, 2, 3, 4]), 0, |a, x| a + x)?;
    assert_eq!(sum, 10);
    Ok(())
}

#[test]
fn reduce_slice_and_map() -> Result<()> {
    let mut words = MemorySource::from_vec(vec!["red", "green", "red", "blue", "red"]);
    let lengths = reduce_slice(&mut words, |mut v, w: &str| {
        v.push(w.len());
        v
    })?;
    assert_eq!(lengths, vec![3, 5, 3, 4, 3]);

    let mut words = MemorySource::from_vec(vec!["red", "green", "red"]);
    let counts = reduce_map(&mut words, |mut m, w| {
        *m.entry(w).or_insert(0usize) += 1;
        m
    })?;
    assert_eq!(counts.len(), 2);
    assert_eq!(counts["red"], 2);
    Ok(())
}

#[test]
fn clean_exhaustion_is_never_an_error() -> Result<()> {
    let mut s = MemorySource::<i32>::from_vec(vec![]);
    assert!(consume(&mut s)?.is_empty());
    assert!(s.error().is_some_and(StreamError::is_eof));
    assert_eq!(reduce(&mut s, 5, |a, x| a + x)?, 5);

    let mut sink = MemorySink::new();
    assert_eq!(pipe(&mut s, &mut sink)?, 0);
    Ok(())
}

#[test]
fn consumers_report_failures() {
    let mut s = MemorySource::with_error(vec![1], StreamError::msg("boom"));
    let err = reduce(&mut s, 0, |a, x| a + x).unwrap_err();
    assert_eq!(err.to_string(), "boom");

    let mut s = MemorySource::with_error(vec![1, 2], StreamError::msg("boom"));
    assert_eq!(consume_err_skip(&mut s), vec![1, 2]);
}

#[test]
fn consumers_do_not_close() -> Result<()> {
    let src = TrackedSource::new(MemorySource::from_vec(vec![1, 2]));
    let closes = src.close_count();
    let mut s = src;
    read_all(&mut s)?;
    pipe(&mut s, &mut MemorySink::new())?;
    assert_eq!(closes.get(), 0);
    s.close()?;
    assert_eq!(closes.get(), 1);
    Ok(())
}

#[test]
fn pipe_flushes_once() -> Result<()> {
    init_tracing();
    let mut sink = FailingSink::unlimited();
    let flushes = sink.flush_count();
    let n = pipe(&mut MemorySource::from_vec(vec!['a', 'b', 'c']), &mut sink)?;
    assert_eq!(n, 3);
    assert_eq!(sink.items(), ['a', 'b', 'c']);
    assert_eq!(flushes.get(), 1);
    Ok(())
}

#[test]
fn pipe_write_failure_reports_partial_count() {
    init_tracing();
    let mut sink = FailingSink::new(2);
    let flushes = sink.flush_count();
    let err = pipe(&mut MemorySource::from_vec(vec![1, 2, 3, 4]), &mut sink).unwrap_err();
    assert_eq!(err.written, 2);
    assert_eq!(sink.items(), [1, 2]);
    assert_eq!(flushes.get(), 0);
}

#[test]
fn pipe_read_failure_skips_flush() {
    let mut sink = FailingSink::unlimited();
    let flushes = sink.flush_count();
    let mut src = MemorySource::with_error(vec![1], StreamError::msg("read"));
    let err = pipe(&mut src, &mut sink).unwrap_err();
    assert_eq!(err.written, 1);
    assert_eq!(err.source.to_string(), "read");
    assert_eq!(flushes.get(), 0);
}

#[test]
fn pipe_into_writer_sink_counts_bytes() -> Result<()> {
    let mut src = MemorySource::from_vec(vec![b"ab".to_vec(), b"cde".to_vec()]);
    let mut sink = WriterSink::new(Vec::<u8>::new());
    assert_eq!(pipe(&mut src, &mut sink)?, 5);
    assert_eq!(sink.get_ref().map(Vec::as_slice), Some(&b"abcde"[..]));
    sink.close()?;
    assert!(sink.get_ref().is_none());
    Ok(())
}

#[test]
fn multicast_fans_out_equally() -> Result<()> {
    let mut a = MemorySink::new();
    let mut b = MemorySink::new();
    let mut c = MemorySink::new();
    let mut src = MemorySource::from_vec(vec![1, 2, 3]);

    let mut dsts: [&mut dyn WriteStream<Item = i32>; 3] = [&mut a, &mut b, &mut c];
    let counts = multicast(&mut src, &mut dsts)?;
    assert_eq!(counts, vec![3, 3, 3]);
    for sink in [&a, &b, &c] {
        assert_eq!(sink.items(), [1, 2, 3]);
    }
    Ok(())
}

#[test]
fn multicast_aborts_on_first_failing_destination() {
    init_tracing();
    let mut ok = MemorySink::new();
    let mut bad = FailingSink::new(1);
    let mut src = MemorySource::from_vec(vec!["x", "y", "z"]);

    let mut dsts: [&mut dyn WriteStream<Item = &str>; 2] = [&mut ok, &mut bad];
    let err = multicast(&mut src, &mut dsts).unwrap_err();
    // "y" reached the first destination before the second one refused it.
    assert_eq!(err.written, vec![2, 1]);
    assert_eq!(ok.items(), ["x", "y"]);
}

#[test]
fn multicast_without_destinations_leaves_source_alone() -> Result<()> {
    let mut src = MemorySource::from_vec(vec![1, 2]);
    let counts = multicast::<_, i32>(&mut src, &mut [])?;
    assert!(counts.is_empty());
    assert_eq!(src.remaining(), 2);
    Ok(())
}

#[test]
fn write_helpers_flush_once() -> Result<()> {
    let mut sink = FailingSink::unlimited();
    let flushes = sink.flush_count();
    assert_eq!(write_all(&mut sink, vec![1, 2])?, 2);
    assert_eq!(write_seq(&mut sink, 3..6)?, 3);
    assert_eq!(sink.items(), [1, 2, 3, 4, 5]);
    assert_eq!(flushes.get(), 2);
    Ok(())
}

#[test]
fn zero_length_writes_are_tolerated() -> Result<()> {
    let mut sink = WriterSink::new(Vec::<u8>::new());
    let n = write_all(&mut sink, vec![b"ab".to_vec(), Vec::new(), b"c".to_vec()])?;
    assert_eq!(n, 3);

    let n = write_seq(&mut sink, std::iter::repeat_n(Vec::new(), 4))?;
    assert_eq!(n, 0);
    assert_eq!(sink.bytes_written(), 3);
    assert_eq!(sink.get_ref().map(Vec::as_slice), Some(&b"abc"[..]));
    sink.close()?;
    Ok(())
}
