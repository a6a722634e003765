//! 路径切分。纯字符串操作，不认识`.`与`..`，大小写敏感。

use alloc::vec::Vec;

pub trait Path {
    fn is_absolute(&self) -> bool;

    /// 按`/`切分，丢弃空的分量。根目录没有分量。
    fn components(&self) -> Vec<&str>;

    /// 返回路径的`(父目录的分量, 文件名)`，根目录返回`None`
    fn parent_file(&self) -> Option<(Vec<&str>, &str)>;
}

impl Path for str {
    fn is_absolute(&self) -> bool {
        self.starts_with('/')
    }

    fn components(&self) -> Vec<&str> {
        self.split('/').filter(|cmp| !cmp.is_empty()).collect()
    }

    fn parent_file(&self) -> Option<(Vec<&str>, &str)> {
        let mut cmps = self.components();
        let file = cmps.pop()?;
        Some((cmps, file))
    }
}
