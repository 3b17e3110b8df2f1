//! Category forest traversal
//!
//! Categories reference their parent, and nothing in the schema prevents a
//! cycle. Walks here run over an in-memory `(id, parent_id)` index with a
//! visited set and a depth cap, so a malformed tree yields a truncated
//! subtree instead of an endless loop.

use std::collections::{HashMap, HashSet, VecDeque};

use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Select,
};
use tracing::warn;

use crate::entities::{category, product};

/// Deepest level below a root that traversal follows
pub const MAX_TREE_DEPTH: usize = 64;

/// Parent/child adjacency of the category forest
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    children: HashMap<i32, Vec<i32>>,
    roots: Vec<i32>,
}

impl CategoryIndex {
    /// Build from `(id, parent_id)` pairs. Sibling order follows input order.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (i32, Option<i32>)>,
    {
        let mut index = CategoryIndex::default();
        for (id, parent) in edges {
            match parent {
                Some(parent_id) => index.children.entry(parent_id).or_default().push(id),
                None => index.roots.push(id),
            }
        }
        index
    }

    /// Load the full forest shape, siblings in display order
    pub async fn load<C: ConnectionTrait>(db: &C) -> Result<Self, DbErr> {
        let edges: Vec<(i32, Option<i32>)> = category::Entity::find()
            .select_only()
            .column(category::Column::Id)
            .column(category::Column::ParentId)
            .order_by_asc(category::Column::SortOrder)
            .order_by_asc(category::Column::Name)
            .into_tuple()
            .all(db)
            .await?;
        Ok(Self::from_edges(edges))
    }

    pub fn roots(&self) -> &[i32] {
        &self.roots
    }

    pub fn children_of(&self, id: i32) -> &[i32] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `root` followed by every category below it, breadth first, each id once
    pub fn descendants_of(&self, root: i32) -> Vec<i32> {
        let mut visited = HashSet::from([root]);
        let mut ids = vec![root];
        let mut queue = VecDeque::from([(root, 0usize)]);

        while let Some((id, depth)) = queue.pop_front() {
            if depth >= MAX_TREE_DEPTH {
                warn!("Category {} exceeds max tree depth, subtree cut", id);
                continue;
            }
            for &child in self.children_of(id) {
                if visited.insert(child) {
                    ids.push(child);
                    queue.push_back((child, depth + 1));
                } else {
                    warn!("Category {} reached twice under {}, cycle cut", child, root);
                }
            }
        }
        ids
    }
}

/// Ids of `root` and all its descendants
pub async fn subtree_ids<C: ConnectionTrait>(db: &C, root: i32) -> Result<Vec<i32>, DbErr> {
    Ok(CategoryIndex::load(db).await?.descendants_of(root))
}

/// Products belonging to `root` or any category below it
pub async fn subtree_products<C: ConnectionTrait>(
    db: &C,
    root: i32,
) -> Result<Select<product::Entity>, DbErr> {
    let ids = subtree_ids(db, root).await?;
    Ok(product::Entity::find().filter(product::Column::CategoryId.is_in(ids)))
}

/// A category with its children and the number of products in its subtree
#[derive(Debug, Clone)]
pub struct CategoryNode {
    pub category: category::Model,
    pub products_count: u64,
    pub children: Vec<CategoryNode>,
}

/// Every category plus per-category product counts, for rendering trees
#[derive(Debug, Clone, Default)]
pub struct CategoryForest {
    categories: HashMap<i32, category::Model>,
    index: CategoryIndex,
    direct_counts: HashMap<i32, u64>,
}

impl CategoryForest {
    pub fn from_parts(models: Vec<category::Model>, direct_counts: HashMap<i32, u64>) -> Self {
        let index = CategoryIndex::from_edges(models.iter().map(|c| (c.id, c.parent_id)));
        let categories = models.into_iter().map(|c| (c.id, c)).collect();
        Self {
            categories,
            index,
            direct_counts,
        }
    }

    pub async fn load<C: ConnectionTrait>(db: &C) -> Result<Self, DbErr> {
        let models = category::Entity::find()
            .order_by_asc(category::Column::SortOrder)
            .order_by_asc(category::Column::Name)
            .all(db)
            .await?;

        let counts: Vec<(i32, i64)> = product::Entity::find()
            .select_only()
            .column(product::Column::CategoryId)
            .column_as(Expr::col(product::Column::Id).count(), "products_count")
            .group_by(product::Column::CategoryId)
            .into_tuple()
            .all(db)
            .await?;

        let direct_counts = counts
            .into_iter()
            .map(|(id, count)| (id, count.max(0) as u64))
            .collect();

        Ok(Self::from_parts(models, direct_counts))
    }

    pub fn get(&self, id: i32) -> Option<&category::Model> {
        self.categories.get(&id)
    }

    pub fn index(&self) -> &CategoryIndex {
        &self.index
    }

    /// Products assigned to the category itself
    pub fn direct_count(&self, id: i32) -> u64 {
        self.direct_counts.get(&id).copied().unwrap_or(0)
    }

    /// Products in the category and everything below it
    pub fn products_count(&self, id: i32) -> u64 {
        self.index
            .descendants_of(id)
            .iter()
            .map(|&c| self.direct_count(c))
            .sum()
    }

    /// The category as a tree node, or `None` if unknown
    pub fn node(&self, id: i32) -> Option<CategoryNode> {
        let mut visited = HashSet::new();
        self.build_node(id, 0, &mut visited)
    }

    /// All root categories as tree nodes
    pub fn roots(&self) -> Vec<CategoryNode> {
        self.index
            .roots()
            .iter()
            .filter_map(|&id| self.node(id))
            .collect()
    }

    fn build_node(&self, id: i32, depth: usize, visited: &mut HashSet<i32>) -> Option<CategoryNode> {
        let category = self.categories.get(&id)?.clone();
        if !visited.insert(id) {
            return None;
        }

        let children = if depth < MAX_TREE_DEPTH {
            self.index
                .children_of(id)
                .iter()
                .filter_map(|&child| self.build_node(child, depth + 1, visited))
                .collect()
        } else {
            Vec::new()
        };

        Some(CategoryNode {
            category,
            products_count: self.products_count(id),
            children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> CategoryIndex {
        // 1 ─┬─ 2 ── 4
        //    └─ 3
        // 5
        CategoryIndex::from_edges(vec![
            (1, None),
            (2, Some(1)),
            (3, Some(1)),
            (4, Some(2)),
            (5, None),
        ])
    }

    #[test]
    fn test_descendants_include_root() {
        let index = sample_index();
        assert_eq!(index.descendants_of(1), vec![1, 2, 3, 4]);
        assert_eq!(index.descendants_of(2), vec![2, 4]);
        assert_eq!(index.descendants_of(5), vec![5]);
        assert_eq!(index.roots(), &[1, 5]);
    }

    #[test]
    fn test_unknown_root_is_just_itself() {
        assert_eq!(sample_index().descendants_of(42), vec![42]);
    }

    #[test]
    fn test_cycle_is_cut() {
        let index = CategoryIndex::from_edges(vec![(1, Some(3)), (2, Some(1)), (3, Some(2))]);
        let mut ids = index.descendants_of(1);
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_depth_limit() {
        let edges = (1..=100).map(|id| (id, if id == 1 { None } else { Some(id - 1) }));
        let index = CategoryIndex::from_edges(edges);
        assert_eq!(index.descendants_of(1).len(), MAX_TREE_DEPTH + 1);
    }

    fn model(id: i32, parent_id: Option<i32>, name: &str) -> category::Model {
        let now = chrono::Utc::now();
        category::Model {
            id,
            name: name.to_string(),
            slug: name.to_lowercase(),
            parent_id,
            image: None,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_forest_rolls_up_counts() {
        let forest = CategoryForest::from_parts(
            vec![
                model(1, None, "Tools"),
                model(2, Some(1), "Drills"),
                model(3, Some(2), "Cordless"),
                model(4, None, "Garden"),
            ],
            HashMap::from([(1, 1), (2, 2), (3, 4)]),
        );

        let roots = forest.roots();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].category.name, "Tools");
        assert_eq!(roots[0].products_count, 7);
        assert_eq!(roots[0].children[0].products_count, 6);
        assert_eq!(roots[0].children[0].children[0].products_count, 4);
        assert_eq!(roots[1].products_count, 0);
        assert!(forest.node(99).is_none());
    }
}
