use pretty_assertions::assert_eq;

use crate::errors::WalError;
use crate::tests::context::TestContext;
use crate::tests::sample_data;
use crate::tests::sample_data::write_four;
use crate::tests::sample_data::write_three;
use crate::Wal;

#[test]
fn test_reopen_preserves_state() -> Result<(), WalError> {
    let ctx = TestContext::new()?;

    let (next, commit, size, entries) = {
        let mut wal = ctx.create_wal()?;
        write_three(&mut wal)?;
        wal.commit(0)?;
        wal.commit(1)?;

        let entries = wal
            .read_range(0, None)?
            .collect::<Result<Vec<_>, WalError>>()?;
        let state = (wal.next(), wal.commit_head(), wal.size(), entries);
        wal.close()?;
        state
    };

    let wal = ctx.open_wal()?;
    assert_eq!(wal.next(), next);
    assert_eq!(wal.commit_head(), commit);
    assert_eq!(wal.size(), size);

    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(&wal.read(i as i32)?, entry);
    }

    Ok(())
}

#[test]
fn test_reopen_after_truncate() -> Result<(), WalError> {
    let ctx = TestContext::new()?;

    {
        let mut wal = ctx.create_wal()?;
        write_four(&mut wal)?;
        wal.commit(0)?;
        wal.truncate(2)?;
        wal.close()?;
    }

    let mut wal = ctx.open_wal()?;
    assert_eq!(wal.next(), 2);
    assert_eq!(wal.commit_head(), 0);
    assert_eq!(
        wal.size(),
        (sample_data::FIRST.len() + sample_data::SECOND.len()) as u64
    );
    assert_eq!(wal.read(1)?, sample_data::SECOND.as_bytes());

    // Truncated LSNs are re-issued after reopen too.
    let lsn = wal.write(b"take two")?;
    assert_eq!(lsn, 2);

    Ok(())
}

#[test]
fn test_on_disk_layout() -> Result<(), WalError> {
    let ctx = TestContext::new()?;

    {
        let mut wal = ctx.create_wal()?;
        wal.write(b"hello")?;
        wal.write(b"world!")?;
        wal.commit(0)?;
        wal.close()?;
    }

    // The log file is the raw concatenation of the payloads.
    let log = std::fs::read(&ctx.config.path).unwrap();
    assert_eq!(log, b"helloworld!");

    let index = std::fs::read(ctx.config.index_path()).unwrap();
    let b = vec![
        73, 68, 88, 36, // marker "IDX$"
        0, 0, 0, 0, // base
        0, 0, 0, 2, // head
        0, 0, 0, 0, // commit
        0, 0, 0, 0, // O(0) = 0
        0, 0, 0, 5, // O(1) = 5
        0, 0, 0, 11, // O(2) = 11, sentinel = log size
    ];
    assert_eq!(index, b);

    Ok(())
}

#[test]
fn test_create_fails_if_exists() -> Result<(), WalError> {
    let ctx = TestContext::new()?;

    let wal = ctx.create_wal()?;
    wal.close()?;

    let res = ctx.create_wal();
    assert!(res.is_err());

    Ok(())
}

#[test]
fn test_second_writable_open_fails() -> Result<(), WalError> {
    let ctx = TestContext::new()?;

    let wal = ctx.create_wal()?;

    // The writable handle holds an exclusive lock on the log file.
    let res = ctx.open_wal();
    assert!(res.is_err());

    // Read-only opens take no lock.
    let ro = ctx.open_wal_read_only()?;
    assert_eq!(ro.next(), 0);

    drop(wal);
    let _wal = ctx.open_wal()?;

    Ok(())
}

#[test]
fn test_open_missing_is_not_found() -> Result<(), WalError> {
    let ctx = TestContext::new()?;

    let err = Wal::open(ctx.config()).unwrap_err();
    match err {
        WalError::Io(e) => {
            assert_eq!(e.kind(), std::io::ErrorKind::NotFound)
        }
        other => panic!("expect NotFound io error, got: {}", other),
    }

    Ok(())
}

#[test]
fn test_open_missing_index_is_not_found() -> Result<(), WalError> {
    let ctx = TestContext::new()?;

    {
        let wal = ctx.create_wal()?;
        wal.close()?;
    }
    std::fs::remove_file(ctx.config.index_path()).unwrap();

    let err = Wal::open(ctx.config()).unwrap_err();
    match err {
        WalError::Io(e) => {
            assert_eq!(e.kind(), std::io::ErrorKind::NotFound)
        }
        other => panic!("expect NotFound io error, got: {}", other),
    }

    Ok(())
}
