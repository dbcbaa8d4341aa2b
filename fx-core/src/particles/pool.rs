//! # Pool 模块
//!
//! 固定容量的 FIFO 粒子池。

use std::collections::VecDeque;

/// 池中的一个成员，附带插入序号
#[derive(Debug, Clone)]
pub struct Entry<T> {
    seq: u64,
    item: T,
}

impl<T> Entry<T> {
    /// 插入序号（同一个池内单调递增）
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn item(&self) -> &T {
        &self.item
    }
}

/// FIFO 池
///
/// 满员时插入会先移除最旧的成员，`len() <= capacity()` 始终成立。
/// 迭代顺序就是插入顺序。
#[derive(Debug, Clone)]
pub struct Pool<T> {
    entries: VecDeque<Entry<T>>,
    capacity: usize,
    next_seq: u64,
}

impl<T> Pool<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            next_seq: 0,
        }
    }

    /// 插入新成员，返回被挤出的成员
    ///
    /// 容量为 0 时新成员本身被原样返回。
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(item);
        }
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front().map(|e| e.item)
        } else {
            None
        };
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push_back(Entry { seq, item });
        evicted
    }

    /// 调整容量；缩小时从最旧的开始丢弃
    pub fn set_capacity(&mut self, capacity: usize) -> usize {
        self.capacity = capacity;
        let excess = self.entries.len().saturating_sub(capacity);
        self.entries.drain(..excess);
        excess
    }

    /// 保留满足条件的成员（顺序不变），返回移除数量
    pub fn retain_mut(&mut self, mut f: impl FnMut(&mut T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain_mut(|e| f(&mut e.item));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 按插入顺序迭代
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|e| &e.item)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().map(|e| &mut e.item)
    }

    /// 带插入序号迭代
    pub fn entries(&self) -> impl Iterator<Item = &Entry<T>> {
        self.entries.iter()
    }

    /// 所有成员的插入序号
    pub fn sequence(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.seq).collect()
    }
}
