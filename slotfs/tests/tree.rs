mod common;

use std::sync::Arc;

use slotfs::{EntryId, EntryKind, Error, Geometry, MAX_DEPTH, NAME_MAX, SlotFileSystem};
use slotfs_dev::RamDevice;

#[test]
fn create_then_resolve() {
    let fs = common::small();

    let a = fs.mkdir("/a").unwrap();
    let b = fs.create("/a/b.txt").unwrap();
    assert_eq!(fs.lookup("/a"), Ok(a));
    assert_eq!(fs.lookup("/a/b.txt"), Ok(b));
    assert_eq!(fs.resolve(&["a", "b.txt"], 2), Ok(b));
    assert_eq!(fs.resolve(&["a", "b.txt"], 1), Ok(a));
    assert_eq!(fs.resolve(&["a", "b.txt"], 0), Ok(EntryId::ROOT));
    assert_eq!(fs.lookup("/"), Ok(fs.root()));

    fs.unlink("/a/b.txt").unwrap();
    assert_eq!(fs.lookup("/a/b.txt"), Err(Error::NotFound));
    fs.rmdir("/a").unwrap();
    assert_eq!(fs.lookup("/a"), Err(Error::NotFound));
    assert_eq!(fs.usage().unwrap().used_entries, 1);
}

#[test]
fn resolve_depth_limits() {
    let fs = common::small();
    assert_eq!(fs.resolve(&["a"], 2), Err(Error::InvalidArgument));

    let deep = vec!["a"; MAX_DEPTH + 1];
    assert_eq!(fs.resolve(&deep, MAX_DEPTH + 1), Err(Error::NotFound));
    assert_eq!(fs.lookup(&"/a".repeat(MAX_DEPTH + 1)), Err(Error::NotFound));

    // 恰好到上限的路径照常解析：/a/a 下的分量不存在
    fs.mkdir("/a").unwrap();
    let a = fs.mkdir("/a/a").unwrap();
    assert_eq!(fs.resolve(&deep, 2), Ok(a));
    assert_eq!(fs.resolve(&deep, MAX_DEPTH), Err(Error::NotFound));
}

#[test]
fn lookup_is_case_sensitive() {
    let fs = common::small();
    fs.create("/Readme").unwrap();
    assert_eq!(fs.lookup("/readme"), Err(Error::NotFound));
    assert!(fs.lookup("//Readme/").is_ok());
}

#[test]
fn non_empty_directory_is_kept() {
    let fs = common::small();
    let a = fs.mkdir("/a").unwrap();
    fs.create("/a/f").unwrap();
    fs.write("/a/f", 0, b"data").unwrap();

    let entries = fs.entries().unwrap();
    let blocks = fs.blocks().unwrap();
    assert_eq!(fs.rmdir("/a"), Err(Error::NotEmpty));
    assert_eq!(fs.remove_entry(a, true), Err(Error::NotEmpty));
    assert_eq!(fs.entries().unwrap(), entries);
    assert_eq!(fs.blocks().unwrap(), blocks);
    assert_eq!(fs.is_empty_dir(a), Ok(false));
}

#[test]
fn remove_subtree() {
    let fs = common::small();
    let a = fs.mkdir("/a").unwrap();
    fs.mkdir("/a/b").unwrap();
    fs.create("/a/b/c").unwrap();
    fs.write("/a/b/c", 0, &[7; 1500]).unwrap();
    fs.create("/keep").unwrap();

    fs.remove_entry(a, false).unwrap();
    let usage = fs.usage().unwrap();
    assert_eq!(usage.used_entries, 2);
    assert_eq!(usage.used_blocks, 0);
    assert_eq!(fs.lookup("/a/b"), Err(Error::NotFound));
    assert!(fs.lookup("/keep").is_ok());
}

#[test]
fn root_is_permanent() {
    let fs = common::small();
    assert_eq!(fs.remove_entry(EntryId::ROOT, false), Err(Error::InvalidArgument));
    assert_eq!(fs.rename_entry(EntryId::ROOT, "x"), Err(Error::InvalidArgument));
    assert_eq!(fs.rmdir("/"), Err(Error::InvalidArgument));
    assert_eq!(fs.mkdir("/"), Err(Error::AlreadyExists));
}

#[test]
fn kind_checks() {
    let fs = common::small();
    fs.mkdir("/d").unwrap();
    fs.create("/f").unwrap();

    assert_eq!(fs.unlink("/d"), Err(Error::IsDirectory));
    assert_eq!(fs.rmdir("/f"), Err(Error::NotADirectory));
    assert_eq!(fs.create("/f/x"), Err(Error::NotADirectory));
    assert_eq!(fs.lookup("/f/x"), Err(Error::NotADirectory));
    assert_eq!(fs.readdir("/f"), Err(Error::NotADirectory));
    assert_eq!(fs.create("/d"), Err(Error::AlreadyExists));
    assert_eq!(fs.create("/missing/x"), Err(Error::NotFound));
}

#[test]
fn names() {
    let fs = common::small();
    let root = fs.root();
    let longest = "n".repeat(NAME_MAX);

    assert_eq!(fs.create_entry(root, "", EntryKind::File), Err(Error::InvalidArgument));
    assert_eq!(fs.create_entry(root, "a/b", EntryKind::File), Err(Error::InvalidArgument));
    assert_eq!(fs.create_entry(root, "a\0b", EntryKind::File), Err(Error::InvalidArgument));
    assert_eq!(
        fs.create_entry(root, &"n".repeat(NAME_MAX + 1), EntryKind::File),
        Err(Error::NameTooLong)
    );

    let id = fs.create_entry(root, &longest, EntryKind::File).unwrap();
    assert_eq!(fs.lookup(&format!("/{longest}")), Ok(id));
    assert_eq!(fs.readdir("/").unwrap()[0].name, longest);
    assert_eq!(fs.usage().unwrap().used_entries, 2);
}

#[test]
fn readdir_in_slot_order() {
    let fs = common::small();
    fs.create("/one").unwrap();
    fs.mkdir("/two").unwrap();
    fs.create("/three").unwrap();
    fs.unlink("/one").unwrap();
    fs.create("/four").unwrap();

    let names: Vec<_> = fs.readdir("/").unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(names, ["four", "two", "three"]);
    let kinds: Vec<_> = fs.readdir("/").unwrap().into_iter().map(|e| e.kind).collect();
    assert_eq!(kinds, [EntryKind::File, EntryKind::Directory, EntryKind::File]);
}

#[test]
fn directory_full() {
    let fs = common::small();
    for i in 0..8 {
        fs.create(&format!("/f{i}")).unwrap();
    }
    assert_eq!(fs.create("/f8"), Err(Error::DirectoryFull));
    // 失败的创建不能留下占用中的元数据项
    assert_eq!(fs.usage().unwrap().used_entries, 9);
    assert_eq!(fs.entries().unwrap().len(), 9);
}

#[test]
fn entry_pool_exhausted() {
    let (_, fs) = common::format(Geometry::new(4, 4));
    fs.mkdir("/a").unwrap();
    fs.mkdir("/a/b").unwrap();
    fs.create("/a/b/c").unwrap();

    assert_eq!(fs.create("/d"), Err(Error::OutOfSpace));
    assert_eq!(fs.usage().unwrap().used_entries, 4);
    assert!(fs.readdir("/").unwrap().iter().all(|e| e.name == "a"));

    // 释放后槽位可以再用
    fs.unlink("/a/b/c").unwrap();
    assert!(fs.create("/d").is_ok());
}

#[test]
fn rename_in_place() {
    let fs = common::small();
    let a = fs.mkdir("/a").unwrap();
    let b = fs.create("/a/b.txt").unwrap();
    fs.write("/a/b.txt", 0, &[b'x'; 1500]).unwrap();
    let before = fs.entries().unwrap();

    fs.rename("/a/b.txt", "/a/c.txt").unwrap();
    assert_eq!(fs.lookup("/a/c.txt"), Ok(b));
    assert_eq!(fs.lookup("/a/b.txt"), Err(Error::NotFound));

    let after = fs.entries().unwrap();
    let old = before.iter().find(|e| e.id == b).unwrap();
    let new = after.iter().find(|e| e.id == b).unwrap();
    assert_eq!(new.name, "c.txt");
    assert_eq!(new.parent, a);
    assert_eq!(new.blocks, old.blocks);

    fs.create("/a/d.txt").unwrap();
    assert_eq!(fs.rename_entry(b, "d.txt"), Err(Error::AlreadyExists));
    assert_eq!(fs.rename_entry(b, "c.txt"), Ok(()));
}

#[test]
fn move_across_directories() {
    let fs = common::small();
    let a = fs.mkdir("/a").unwrap();
    let d = fs.mkdir("/d").unwrap();
    let f = fs.create("/a/f").unwrap();
    fs.write("/a/f", 0, b"moved").unwrap();

    fs.rename("/a/f", "/d/g").unwrap();
    assert_eq!(fs.lookup("/d/g"), Ok(f));
    assert_eq!(fs.lookup("/a/f"), Err(Error::NotFound));
    assert_eq!(fs.is_empty_dir(a), Ok(true));
    assert_eq!(fs.read("/d/g", 0, 16).unwrap(), b"moved");
    let info = fs.entries().unwrap().into_iter().find(|e| e.id == f).unwrap();
    assert_eq!(info.parent, d);

    fs.create("/a/g").unwrap();
    assert_eq!(fs.move_entry(f, a, "g"), Err(Error::AlreadyExists));
    assert_eq!(fs.lookup("/d/g"), Ok(f));
}

#[test]
fn move_rejects_cycles_and_full_targets() {
    let fs = common::small();
    let a = fs.mkdir("/a").unwrap();
    let b = fs.mkdir("/a/b").unwrap();
    assert_eq!(fs.move_entry(a, b, "a"), Err(Error::InvalidArgument));
    assert_eq!(fs.move_entry(a, a, "x"), Err(Error::InvalidArgument));
    assert_eq!(fs.move_entry(EntryId::ROOT, a, "root"), Err(Error::InvalidArgument));

    let full = fs.mkdir("/full").unwrap();
    for i in 0..8 {
        fs.create(&format!("/full/{i}")).unwrap();
    }
    let entries = fs.entries().unwrap();
    assert_eq!(fs.move_entry(b, full, "b"), Err(Error::DirectoryFull));
    assert_eq!(fs.entries().unwrap(), entries);
}

#[test]
fn reopen_keeps_tree() {
    let geometry = Geometry::new(8, 8);
    let (dev, fs) = common::format(geometry);
    fs.mkdir("/a").unwrap();
    let b = fs.create("/a/b").unwrap();
    fs.write("/a/b", 0, b"persisted").unwrap();
    drop(fs);

    let fs = SlotFileSystem::open(dev).unwrap();
    assert_eq!(fs.geometry(), geometry);
    assert_eq!(fs.lookup("/a/b"), Ok(b));
    assert_eq!(fs.read("/a/b", 0, 64).unwrap(), b"persisted");
}

#[test]
fn open_rejects_foreign_images() {
    let (dev, _) = common::format(Geometry::new(4, 4));
    let image = dev.snapshot();

    // 魔数
    let mut bad = image.clone();
    bad[0] ^= 0xff;
    let open = |bytes: Vec<u8>| SlotFileSystem::open(Arc::new(RamDevice::from_bytes(bytes)));
    assert_eq!(open(bad).err(), Some(Error::Corrupted));

    // 页大小：magic(4) + version(2) + size_mode(1) 之后，1024 的第二个字节
    let mut bad = image.clone();
    bad[8] = 0;
    assert_eq!(open(bad).err(), Some(Error::Corrupted));

    let mut short = image.clone();
    short.truncate(image.len() - 1);
    assert_eq!(open(short).err(), Some(Error::Corrupted));

    assert_eq!(open(vec![0; 16]).err(), Some(Error::Corrupted));
    assert!(open(image).is_ok());
}

#[test]
fn format_checks_geometry() {
    let dev = common::device(Geometry::new(4, 4));
    assert_eq!(
        SlotFileSystem::format(dev.clone(), Geometry::new(0, 4)).err(),
        Some(Error::InvalidGeometry)
    );
    assert_eq!(
        SlotFileSystem::format(dev.clone(), Geometry::new(4, 5)).err(),
        Some(Error::InvalidGeometry)
    );
    assert!(SlotFileSystem::format(dev, Geometry::new(4, 4)).is_ok());
}
