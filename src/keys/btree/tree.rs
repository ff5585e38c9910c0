//! keys/btree/tree — B-дерево пар (key, PageRef), сравнение ключей
//! лексикографическое по байтам.
//!
//! Классические инварианты (CLRS):
//! - узел несёт не более 2*degree-1 элементов;
//! - каждый не-корневой узел несёт не менее degree-1;
//! - split при вставке в полного ребёнка, steal/merge при удалении;
//! - глубина всех листьев одинакова.
//!
//! Обход диапазона: один спуск, дальше in-order с предикатом продолжения.

use std::cmp::Ordering;

use crate::page::PageRef;

#[derive(Debug, Clone)]
pub(super) struct Item {
    pub key: Vec<u8>,
    pub pos: PageRef,
}

#[derive(Debug, Default)]
struct Node {
    items: Vec<Item>,
    children: Vec<Node>,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn find(&self, key: &[u8]) -> std::result::Result<usize, usize> {
        self.items.binary_search_by(|it| it.key.as_slice().cmp(key))
    }
}

#[derive(Debug)]
pub(super) struct BTree {
    degree: usize,
    root: Node,
    len: usize,
}

impl BTree {
    /// Паника при degree < 2: такое дерево не может держать инварианты.
    pub fn new(degree: usize) -> Self {
        assert!(degree >= 2, "btree: degree must be >= 2");
        Self {
            degree,
            root: Node::default(),
            len: 0,
        }
    }

    fn max_items(&self) -> usize {
        2 * self.degree - 1
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn get(&self, key: &[u8]) -> Option<PageRef> {
        let mut node = &self.root;
        loop {
            match node.find(key) {
                Ok(i) => return Some(node.items[i].pos),
                Err(i) => {
                    if node.is_leaf() {
                        return None;
                    }
                    node = &node.children[i];
                }
            }
        }
    }

    /// Вставить пару; существующий ключ заменяется, возвращается его
    /// прежний PageRef.
    pub fn replace_or_insert(&mut self, key: &[u8], pos: PageRef) -> Option<PageRef> {
        if self.root.items.len() == self.max_items() {
            // Корень полон: дерево растёт вверх на один уровень.
            let old_root = std::mem::take(&mut self.root);
            self.root.children.push(old_root);
            Self::split_child(&mut self.root, 0, self.degree);
        }
        let prev = Self::insert_non_full(&mut self.root, key, pos, self.degree);
        if prev.is_none() {
            self.len += 1;
        }
        prev
    }

    /// Удалить ключ, вернуть его прежний PageRef.
    pub fn delete(&mut self, key: &[u8]) -> Option<PageRef> {
        if self.root.items.is_empty() && self.root.is_leaf() {
            return None;
        }
        let removed = Self::remove_node(&mut self.root, key, self.degree);
        if self.root.items.is_empty() && !self.root.is_leaf() {
            // Дерево сжимается на один уровень.
            let new_root = self.root.children.remove(0);
            self.root = new_root;
        }
        if removed.is_some() {
            self.len -= 1;
        }
        removed.map(|it| it.pos)
    }

    /// In-order обход пар с min <= key < max; f возвращает false,
    /// чтобы остановиться.
    pub fn ascend_range<F>(&self, min: &[u8], max: &[u8], f: &mut F)
    where
        F: FnMut(&[u8], PageRef) -> bool,
    {
        Self::visit(&self.root, min, max, f);
    }

    fn visit<F>(node: &Node, min: &[u8], max: &[u8], f: &mut F) -> bool
    where
        F: FnMut(&[u8], PageRef) -> bool,
    {
        let start = node
            .items
            .partition_point(|it| it.key.as_slice() < min);
        for i in start..node.items.len() {
            if !node.is_leaf() && !Self::visit(&node.children[i], min, max, f) {
                return false;
            }
            let it = &node.items[i];
            if it.key.as_slice() >= max {
                return false;
            }
            if !f(&it.key, it.pos) {
                return false;
            }
        }
        if !node.is_leaf() {
            return Self::visit(&node.children[node.items.len()], min, max, f);
        }
        true
    }

    // ---------------- insert internals ----------------

    /// Разделить полного ребёнка i: средний элемент поднимается в node,
    /// правая половина уезжает в нового соседа.
    fn split_child(node: &mut Node, i: usize, degree: usize) {
        let child = &mut node.children[i];
        let right_items = child.items.split_off(degree);
        let mid_item = child.items.pop().expect("split of a non-full node");
        let right_children = if child.is_leaf() {
            Vec::new()
        } else {
            child.children.split_off(degree)
        };

        node.items.insert(i, mid_item);
        node.children.insert(
            i + 1,
            Node {
                items: right_items,
                children: right_children,
            },
        );
    }

    fn insert_non_full(node: &mut Node, key: &[u8], pos: PageRef, degree: usize) -> Option<PageRef> {
        match node.find(key) {
            Ok(i) => Some(std::mem::replace(&mut node.items[i].pos, pos)),
            Err(mut i) => {
                if node.is_leaf() {
                    node.items.insert(
                        i,
                        Item {
                            key: key.to_vec(),
                            pos,
                        },
                    );
                    return None;
                }
                if node.children[i].items.len() == 2 * degree - 1 {
                    Self::split_child(node, i, degree);
                    match key.cmp(node.items[i].key.as_slice()) {
                        Ordering::Greater => i += 1,
                        Ordering::Equal => {
                            return Some(std::mem::replace(&mut node.items[i].pos, pos));
                        }
                        Ordering::Less => {}
                    }
                }
                Self::insert_non_full(&mut node.children[i], key, pos, degree)
            }
        }
    }

    // ---------------- delete internals ----------------

    fn remove_node(node: &mut Node, key: &[u8], degree: usize) -> Option<Item> {
        match node.find(key) {
            Ok(i) => {
                if node.is_leaf() {
                    return Some(node.items.remove(i));
                }
                if node.children[i].items.len() >= degree {
                    // Заменяем предшественником из левого поддерева.
                    let pred = Self::remove_max(&mut node.children[i], degree);
                    Some(std::mem::replace(&mut node.items[i], pred))
                } else if node.children[i + 1].items.len() >= degree {
                    let succ = Self::remove_min(&mut node.children[i + 1], degree);
                    Some(std::mem::replace(&mut node.items[i], succ))
                } else {
                    // Оба соседних ребёнка минимальны: слить и спуститься.
                    Self::merge_children(node, i);
                    Self::remove_node(&mut node.children[i], key, degree)
                }
            }
            Err(i) => {
                if node.is_leaf() {
                    return None;
                }
                let i = Self::ensure_child(node, i, degree);
                Self::remove_node(&mut node.children[i], key, degree)
            }
        }
    }

    fn remove_max(node: &mut Node, degree: usize) -> Item {
        if node.is_leaf() {
            return node.items.pop().expect("remove_max of an empty node");
        }
        let last = node.children.len() - 1;
        let last = Self::ensure_child(node, last, degree);
        Self::remove_max(&mut node.children[last], degree)
    }

    fn remove_min(node: &mut Node, degree: usize) -> Item {
        if node.is_leaf() {
            return node.items.remove(0);
        }
        let i = Self::ensure_child(node, 0, degree);
        Self::remove_min(&mut node.children[i], degree)
    }

    /// Перед спуском в ребёнка i гарантируем ему >= degree элементов:
    /// одалживаем у соседа через разделитель либо сливаем с соседом.
    /// Возвращает (возможно сдвинутый) индекс ребёнка.
    fn ensure_child(node: &mut Node, i: usize, degree: usize) -> usize {
        if node.children[i].items.len() >= degree {
            return i;
        }
        if i > 0 && node.children[i - 1].items.len() >= degree {
            // Крадём максимум левого соседа.
            let stolen = node.children[i - 1].items.pop().expect("non-empty sibling");
            let sep = std::mem::replace(&mut node.items[i - 1], stolen);
            node.children[i].items.insert(0, sep);
            if !node.children[i - 1].is_leaf() {
                let moved = node.children[i - 1].children.pop().expect("non-leaf sibling");
                node.children[i].children.insert(0, moved);
            }
            i
        } else if i + 1 < node.children.len() && node.children[i + 1].items.len() >= degree {
            // Крадём минимум правого соседа.
            let stolen = node.children[i + 1].items.remove(0);
            let sep = std::mem::replace(&mut node.items[i], stolen);
            node.children[i].items.push(sep);
            if !node.children[i + 1].is_leaf() {
                let moved = node.children[i + 1].children.remove(0);
                node.children[i].children.push(moved);
            }
            i
        } else if i > 0 {
            Self::merge_children(node, i - 1);
            i - 1
        } else {
            Self::merge_children(node, i);
            i
        }
    }

    /// Слить children[i], items[i], children[i+1] в одного ребёнка.
    fn merge_children(node: &mut Node, i: usize) {
        let sep = node.items.remove(i);
        let right = node.children.remove(i + 1);
        let left = &mut node.children[i];
        left.items.push(sep);
        left.items.extend(right.items);
        left.children.extend(right.children);
    }
}
