//! Scripted walkthrough of the file-backed vector
//!
//! Fills, rewrites, copies, grows, splices and swaps a handful of vectors in a
//! scratch directory, checking every step. Run with `RUST_LOG=debug` to see the
//! backing store remap as the vectors grow.

use clap::Parser;
use filevec::{Element, FileVec, NonTrivial};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Exercise FileVec against files in a directory
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory for the backing files (a temporary directory if omitted)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Elements per page used to size the fill phase
    #[arg(short, long, default_value = "4096")]
    page: usize,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Element with a constructor, destructor and equality
#[derive(Debug, Clone, Default, PartialEq)]
struct IntObj {
    x: i32,
}

impl Drop for IntObj {
    fn drop(&mut self) {
        self.x = 0;
    }
}

// SAFETY: a single integer field, valid for any persisted bit pattern
unsafe impl Element for IntObj {
    type Lifecycle = NonTrivial;
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let scratch = tempfile::tempdir()?;
    let dir = args.dir.unwrap_or_else(|| scratch.path().to_path_buf());
    std::fs::create_dir_all(&dir)?;
    let page = args.page;

    // Fill, rewrite through cursors, copy
    let mut test1 = FileVec::<i32>::open(dir.join("test1"))?;
    test1.clear();
    for i in 0..page {
        test1.push_back(&(i as i32))?;
        assert_eq!(*test1.at(i)?, i as i32);
    }

    let mut cursor = test1.begin_mut();
    while !cursor.at_end() {
        cursor[0] = 1;
        cursor.inc();
    }
    drop(cursor);
    assert!(test1.rbegin().until(test1.rend()).all(|&value| value == 1));

    for _ in 0..page {
        test1.push_back(&2)?;
    }
    assert_eq!(test1.size(), 2 * page);
    assert!(test1.at(2 * page).is_err());

    let mut test2 = FileVec::<i32>::open(dir.join("test2"))?;
    test2.assign_iter(test1.begin().until(test1.end()).copied())?;
    assert_eq!(test1, test2);
    test1.close()?;
    test2.close()?;
    info!(elements = 2 * page, "int vectors filled and copied");

    // Non-trivial elements
    let io = IntObj { x: 3 };
    let mut test3 = FileVec::<IntObj>::open(dir.join("test3"))?;
    test3.clear();
    for _ in 0..page {
        test3.push_back(&io)?;
    }

    let mut test4 = FileVec::<IntObj>::open(dir.join("test4"))?;
    test4.copy_from(&test3)?;
    assert_eq!(test3, test4);

    let end = test4.len();
    test4.insert(end, IntObj { x: 999 })?;
    assert_eq!(test4.back().x, 999);

    let mut test5 = FileVec::from_file_vec(dir.join("test5"), &test4)?;
    test5.emplace_back(|| IntObj { x: 888 })?;
    assert_eq!(test5.back().x, 888);

    test3.close()?;
    test4.close()?;
    test5.close()?;
    info!(elements = page + 2, "object vectors copied and extended");

    // Positional insert, erase and swap
    let mut test6 = FileVec::<i32>::open(dir.join("test6"))?;
    test6.assign_slice(&[1, 2, 3, 4, 5, 6, 7, 8, 9])?;
    test6.close()?;

    let mut b = FileVec::from_slice(dir.join("test7"), &[9, 8, 7, 6, 5, 4, 3, 2, 1, 0])?;
    let source = FileVec::<i32>::open(dir.join("test6"))?;
    let mut a = FileVec::from_file_vec(dir.join("test8"), &source)?;
    drop(source);

    a.insert(0, 999)?;
    a.insert_n(0, 2, &999)?;
    let count = a.len() + 2;
    a.insert_n(0, count, &999)?;
    a.insert_iter(2, (b.begin() + 1).until(b.end() - 1).copied())?;
    let pos = a.len() - 3;
    a.insert_slice(pos, &b[1..b.len() - 1])?;
    a.erase(0)?;
    a.erase(0)?;
    a.erase_range(8..23)?;

    let spliced = a.to_vec();
    a.swap(&mut b);
    std::mem::swap(&mut a, &mut b);
    b.swap(&mut a);

    assert_eq!(b, spliced);
    assert_eq!(a, [9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
    info!(?spliced, "splice and swap");

    info!("done");
    Ok(())
}
