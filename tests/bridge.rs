use anyhow::Result;
use pullflow::testing::*;
use pullflow::*;

#[test]
fn for_loop_over_pipeline() -> Result<()> {
    let mut squares = Vec::new();
    for item in IterSource::new(1..=4).map(|x: i32| x * x).items() {
        squares.push(item?);
    }
    assert_eq!(squares, vec![1, 4, 9, 16]);
    Ok(())
}

#[test]
fn close_runs_once_on_exhaustion() {
    let src = TrackedSource::new(MemorySource::from_vec(vec![1, 2]));
    let closes = src.close_count();
    let mut it = src.items();
    assert_eq!(it.by_ref().count(), 2);
    assert_eq!(closes.get(), 1);
    assert!(it.next().is_none());
    drop(it);
    assert_eq!(closes.get(), 1);
}

#[test]
fn close_runs_once_on_break() {
    let src = TrackedSource::new(IterSource::new(0..));
    let closes = src.close_count();
    for item in src.batch(10).items() {
        match item {
            Ok(batch) if batch[0] >= 30 => break,
            Ok(_) => {}
            Err(e) => panic!("unexpected failure: {e}"),
        }
    }
    assert_eq!(closes.get(), 1);
}

#[test]
fn failure_surfaces_as_err_item() {
    let src = MemorySource::with_error(vec!["a", "b"], StreamError::msg("broken pipe"));
    let collected: std::result::Result<Vec<_>, _> = src.items().collect();
    assert_eq!(collected.unwrap_err().to_string(), "broken pipe");
}

#[test]
fn close_failure_is_kept() {
    let cursor = VecCursor::new(Vec::<u8>::new()).fail_close();
    let mut it = CursorSource::new(cursor).items();
    // The cursor is released during the last advance, so the release failure
    // is the terminal error rather than a close error.
    assert!(matches!(it.next(), Some(Err(_))));
    assert!(it.next().is_none());
    assert!(it.close_error().is_none());
}
