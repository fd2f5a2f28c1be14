use anyhow::Result;
use pullflow::testing::*;
use pullflow::*;
use std::sync::mpsc;
use std::thread;

#[test]
fn memory_source_yields_in_order() -> Result<()> {
    let mut s: MemorySource<String> = ["x", "y", "z"].iter().map(|s| s.to_string()).collect();
    assert_eq!(s.remaining(), 3);
    assert!(s.advance());
    assert_eq!(s.current(), "x");
    assert_eq!(consume(&mut s)?, vec!["y", "z"]);
    assert!(s.error().is_some_and(StreamError::is_eof));
    s.close()?;
    Ok(())
}

#[test]
fn current_before_advance_is_default() {
    let s = MemorySource::from_vec(vec![7u64]);
    assert_eq!(s.current(), 0);
}

#[test]
fn channel_producer_thread() -> Result<()> {
    let (tx, rx) = mpsc::channel::<u32>();
    let producer = thread::spawn(move || {
        for i in 0..500 {
            if tx.send(i).is_err() {
                break;
            }
        }
    });

    let mut s = ChannelSource::new(rx).filter(|x: &u32| x % 100 == 0);
    assert_eq!(consume(&mut s)?, vec![0, 100, 200, 300, 400]);
    s.close()?;
    producer.join().map_err(|_| anyhow::anyhow!("producer panicked"))?;
    Ok(())
}

#[test]
fn closing_a_channel_source_releases_the_receiver() -> Result<()> {
    let (tx, rx) = mpsc::channel::<u8>();
    tx.send(1)?;
    let mut s = ChannelSource::new(rx);
    assert!(s.advance());
    s.close()?;
    assert!(tx.send(2).is_err(), "receiver should be dropped");
    assert!(!s.advance());
    Ok(())
}

#[test]
fn lines_strip_terminators() -> Result<()> {
    let input = "alpha\r\nbeta\n\ngamma";
    let mut s = LineSource::new(input.as_bytes());
    assert_eq!(consume(&mut s)?, vec!["alpha", "beta", "", "gamma"]);
    assert_eq!(s.lines_read(), 4);
    Ok(())
}

#[test]
fn lines_reject_invalid_utf8() {
    let input: &[u8] = b"ok\n\xff\xfe\nnever\n";
    let (items, msg) = assert_stream_fails(LineSource::new(input));
    assert_eq!(items, vec!["ok"]);
    assert!(msg.contains('2'), "{msg}");
}

#[test]
fn cursor_rows_then_release() -> Result<()> {
    let cursor = VecCursor::new(vec![("a".to_string(), 1u32), ("b".to_string(), 2)]);
    let releases = cursor.close_count();
    let mut s = CursorSource::new(cursor);
    let total = reduce(&mut s, 0, |acc, (_, n)| acc + n)?;
    assert_eq!(total, 3);
    assert_eq!(releases.get(), 1);
    s.close()?;
    assert_eq!(releases.get(), 1);
    Ok(())
}

#[test]
fn cursor_scan_failure_is_not_eof() {
    let cursor = VecCursor::new(vec![1, 2, 3]).fail_scan_at(1);
    let (items, _) = assert_stream_fails(CursorSource::new(cursor));
    assert_eq!(items, vec![1]);
}

#[test]
fn cursor_release_failure_becomes_terminal_error() {
    let cursor = VecCursor::new(vec![1]).fail_close();
    let (items, _) = assert_stream_fails(CursorSource::new(cursor));
    assert_eq!(items, vec![1]);
}

#[test]
fn concat_stops_at_failing_member() -> Result<()> {
    let ok = MemorySource::from_vec(vec![1, 2]);
    let bad = MemorySource::with_error(vec![3], StreamError::msg("member down"));
    let never = TrackedSource::new(MemorySource::from_vec(vec![4]));
    let closes = never.close_count();

    let mut s = Concat::new(vec![ok.boxed(), bad.boxed(), never.boxed()]);
    let mut seen = Vec::new();
    while s.advance() {
        seen.push(s.current());
    }
    assert_eq!(seen, vec![1, 2, 3]);
    assert_eq!(s.error().map(ToString::to_string).as_deref(), Some("member down"));

    s.close()?;
    assert_eq!(closes.get(), 1);
    Ok(())
}

#[test]
fn chain_reads_second_stream_after_first() -> Result<()> {
    let mut s = IterSource::new(vec!['a', 'b']).chain(MemorySource::from_vec(vec!['c']));
    assert_eq!(consume(&mut s)?, vec!['a', 'b', 'c']);
    Ok(())
}
