// Collision resolution strategies.
//
// Given a detected collision, propose() builds every applicable strategy
// with a cost and returns them cheapest first. An empty list means the
// operation should be refused. Each strategy carries the concrete moves it
// would make, so apply() only commits what propose() already validated.
//
// Costs:
// - push:       sum over pushed widgets of (shift * width)
// - reposition: Euclidean distance from the candidate to the free spot
// - swap:       |area(candidate) - area(target)|

use std::collections::VecDeque;

use log::debug;
use serde::Serialize;

use super::collision::{CollisionDetector, CollisionResult};
use super::geometry::{overlaps, GridBounds, GridRect};
use super::model::Widget;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionKind {
    Push,
    Swap,
    Reposition,
}

/// One widget changing position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetMove {
    pub id: String,
    pub old_position: GridRect,
    pub new_position: GridRect,
}

impl WidgetMove {
    pub fn distance(&self) -> f64 {
        self.old_position.distance_to(&self.new_position)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionStrategy {
    pub kind: ResolutionKind,
    pub target_widget_ids: Vec<String>,
    /// Where the moving widget ends up.
    pub suggested_position: Option<GridRect>,
    pub cost: f64,
    pub planned_moves: Vec<WidgetMove>,
}

/// The widget being moved, resized or added, and where the caller wants it.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub widget_id: String,
    pub candidate: GridRect,
    /// Position before the operation; `None` for a widget being added.
    pub original: Option<GridRect>,
}

#[derive(Debug, Clone, Default)]
pub struct CollisionResolver {
    detector: CollisionDetector,
}

impl CollisionResolver {
    pub fn new(detector: CollisionDetector) -> Self {
        Self { detector }
    }

    /// Applicable strategies, cheapest first. Empty means reject.
    pub fn propose(
        &self,
        request: &ResolveRequest,
        collision: &CollisionResult,
        widgets: &[Widget],
        bounds: GridBounds,
    ) -> Vec<ResolutionStrategy> {
        if !collision.has_collision {
            return Vec::new();
        }

        let colliders: Vec<usize> = collision
            .collision_areas
            .iter()
            .filter_map(|area| widgets.iter().position(|w| w.id == area.widget_id))
            .collect();

        let mut strategies = Vec::new();
        strategies.extend(self.push_strategy(request, &colliders, widgets, bounds));
        strategies.extend(self.reposition_strategy(request, widgets, bounds));
        strategies.extend(self.swap_strategy(request, &colliders, widgets, bounds));

        // Stable: equal costs keep push < reposition < swap.
        strategies.sort_by(|a, b| a.cost.total_cmp(&b.cost));

        debug!(
            "resolve '{}': {} collider(s), strategies {:?}",
            request.widget_id,
            colliders.len(),
            strategies.iter().map(|s| (s.kind, s.cost)).collect::<Vec<_>>()
        );
        strategies
    }

    /// Commit a strategy's planned moves to `widgets`.
    pub fn apply(&self, strategy: &ResolutionStrategy, widgets: &mut [Widget]) -> Vec<WidgetMove> {
        let mut applied = Vec::with_capacity(strategy.planned_moves.len());
        for mv in &strategy.planned_moves {
            if let Some(w) = widgets.iter_mut().find(|w| w.id == mv.id) {
                w.position = mv.new_position;
                applied.push(mv.clone());
            }
        }
        applied
    }

    fn push_strategy(
        &self,
        request: &ResolveRequest,
        colliders: &[usize],
        widgets: &[Widget],
        bounds: GridBounds,
    ) -> Option<ResolutionStrategy> {
        if colliders.iter().any(|&i| widgets[i].locked) {
            return None;
        }

        let candidate = request.candidate;
        // At least the candidate's height; more if a collider starts above it.
        let distance = colliders
            .iter()
            .map(|&i| candidate.row_end - widgets[i].position.row_start)
            .fold(candidate.height(), i32::max);

        let mut positions: Vec<GridRect> = widgets.iter().map(|w| w.position).collect();
        let moving = widgets.iter().position(|w| w.id == request.widget_id);
        if let Some(m) = moving {
            positions[m] = candidate;
        }

        let mut queue = VecDeque::new();
        for &i in colliders {
            positions[i] = positions[i].translated(0, distance);
            queue.push_back(i);
        }

        // Cascade: anything a pushed widget now lands on is pushed below it.
        while let Some(i) = queue.pop_front() {
            let rect = positions[i];
            if !bounds.contains(&rect) {
                return None;
            }
            for j in 0..widgets.len() {
                if j == i || Some(j) == moving || !overlaps(&rect, &positions[j]) {
                    continue;
                }
                if widgets[j].locked {
                    return None;
                }
                let shift = rect.row_end - positions[j].row_start;
                positions[j] = positions[j].translated(0, shift);
                queue.push_back(j);
            }
        }

        let mut planned = Vec::new();
        let mut cost = 0.0;
        let mut targets = Vec::new();
        for (i, w) in widgets.iter().enumerate() {
            if positions[i] == w.position {
                continue;
            }
            if Some(i) != moving {
                let shift = positions[i].row_start - w.position.row_start;
                cost += f64::from(shift * w.position.width());
                targets.push(w.id.clone());
            }
            planned.push(WidgetMove {
                id: w.id.clone(),
                old_position: w.position,
                new_position: positions[i],
            });
        }

        Some(ResolutionStrategy {
            kind: ResolutionKind::Push,
            target_widget_ids: targets,
            suggested_position: Some(candidate),
            cost,
            planned_moves: planned,
        })
    }

    fn reposition_strategy(
        &self,
        request: &ResolveRequest,
        widgets: &[Widget],
        bounds: GridBounds,
    ) -> Option<ResolutionStrategy> {
        let candidate = request.candidate;
        let spot = self.detector.find_alternative_position(
            candidate.width(),
            candidate.height(),
            candidate.origin(),
            widgets,
            Some(request.widget_id.as_str()),
            bounds,
        )?;

        let mut planned = Vec::new();
        if let Some(original) = request.original {
            if original != spot {
                planned.push(WidgetMove { id: request.widget_id.clone(), old_position: original, new_position: spot });
            }
        }

        Some(ResolutionStrategy {
            kind: ResolutionKind::Reposition,
            target_widget_ids: Vec::new(),
            suggested_position: Some(spot),
            cost: candidate.distance_to(&spot),
            planned_moves: planned,
        })
    }

    fn swap_strategy(
        &self,
        request: &ResolveRequest,
        colliders: &[usize],
        widgets: &[Widget],
        bounds: GridBounds,
    ) -> Option<ResolutionStrategy> {
        let original = request.original?;
        let candidate = request.candidate;

        // Only the first qualifying collider is considered.
        let &t = colliders.iter().find(|&&i| {
            let w = &widgets[i];
            !w.locked
                && w.position.area() < candidate.area()
                && original.can_contain(w.position.width(), w.position.height())
        })?;
        let target = &widgets[t];
        let target_rect = target.position.moved_to(original.column_start, original.row_start);

        if !bounds.contains(&target_rect) || !bounds.contains(&candidate) || overlaps(&target_rect, &candidate) {
            return None;
        }
        // Both destinations must be clear of every third widget.
        let third_party_clash = widgets.iter().any(|w| {
            w.id != request.widget_id
                && w.id != target.id
                && (overlaps(&w.position, &target_rect) || overlaps(&w.position, &candidate))
        });
        if third_party_clash {
            return None;
        }

        Some(ResolutionStrategy {
            kind: ResolutionKind::Swap,
            target_widget_ids: vec![target.id.clone()],
            suggested_position: Some(candidate),
            cost: f64::from((candidate.area() - target.position.area()).abs()),
            planned_moves: vec![
                WidgetMove { id: request.widget_id.clone(), old_position: original, new_position: candidate },
                WidgetMove { id: target.id.clone(), old_position: target.position, new_position: target_rect },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(id: &str, col: i32, row: i32, w: i32, h: i32) -> Widget {
        Widget::new(id, "stats", GridRect::at(col, row, w, h))
    }

    fn resolve(widgets: &[Widget], id: &str, candidate: GridRect, bounds: GridBounds) -> Vec<ResolutionStrategy> {
        let original = widgets.iter().find(|w| w.id == id).map(|w| w.position);
        let request = ResolveRequest { widget_id: id.to_string(), candidate, original };
        let collision = CollisionDetector::default().detect(&candidate, widgets, Some(id));
        CollisionResolver::default().propose(&request, &collision, widgets, bounds)
    }

    #[test]
    fn test_no_collision_no_strategies() {
        let widgets = vec![widget("a", 1, 1, 2, 2)];
        let out = resolve(&widgets, "b", GridRect::at(3, 1, 2, 2), GridBounds::new(8, 20));
        assert!(out.is_empty());
    }

    #[test]
    fn test_reposition_clears_collision() {
        let widgets = vec![widget("a", 1, 1, 2, 2)];
        let candidate = GridRect::at(2, 2, 2, 2);
        let out = resolve(&widgets, "b", candidate, GridBounds::new(8, 20));

        let repo = out.iter().find(|s| s.kind == ResolutionKind::Reposition).unwrap();
        let spot = repo.suggested_position.unwrap();
        assert!(!CollisionDetector::default().detect(&spot, &widgets, None).has_collision);
        assert!((repo.cost - candidate.distance_to(&spot)).abs() < 1e-9);
    }

    #[test]
    fn test_strategies_sorted_by_cost() {
        let widgets = vec![widget("a", 1, 1, 2, 2), widget("b", 5, 1, 2, 2)];
        let out = resolve(&widgets, "b", GridRect::at(1, 1, 2, 2), GridBounds::new(8, 20));
        assert!(!out.is_empty());
        assert!(out.windows(2).all(|w| w[0].cost <= w[1].cost));
    }

    #[test]
    fn test_push_cascades_and_costs() {
        let widgets = vec![
            widget("mover", 5, 1, 2, 2),
            widget("a", 1, 1, 2, 2),
            widget("below", 1, 3, 3, 1),
        ];
        let out = resolve(&widgets, "mover", GridRect::at(1, 1, 2, 2), GridBounds::new(8, 20));
        let push = out.iter().find(|s| s.kind == ResolutionKind::Push).unwrap();

        assert_eq!(push.target_widget_ids, vec!["a".to_string(), "below".to_string()]);
        let a = push.planned_moves.iter().find(|m| m.id == "a").unwrap();
        assert_eq!(a.new_position, GridRect::at(1, 3, 2, 2));
        let below = push.planned_moves.iter().find(|m| m.id == "below").unwrap();
        assert_eq!(below.new_position, GridRect::at(1, 5, 3, 1));
        // a: 2 rows * 2 wide, below: 2 rows * 3 wide
        assert_eq!(push.cost, 10.0);
    }

    #[test]
    fn test_locked_collider_blocks_push_and_swap() {
        let widgets = vec![widget("mover", 5, 1, 3, 3), widget("a", 1, 1, 1, 1).locked()];
        let out = resolve(&widgets, "mover", GridRect::at(1, 1, 3, 3), GridBounds::new(8, 20));
        assert!(out.iter().all(|s| s.kind == ResolutionKind::Reposition));
    }

    #[test]
    fn test_swap_smaller_collider() {
        let widgets = vec![widget("big", 5, 1, 2, 2), widget("small", 1, 1, 2, 1)];
        let out = resolve(&widgets, "big", GridRect::at(1, 1, 2, 2), GridBounds::new(8, 20));
        let swap = out.iter().find(|s| s.kind == ResolutionKind::Swap).unwrap();

        assert_eq!(swap.cost, 2.0);
        assert_eq!(swap.target_widget_ids, vec!["small".to_string()]);
        let small = swap.planned_moves.iter().find(|m| m.id == "small").unwrap();
        assert_eq!(small.new_position, GridRect::at(5, 1, 2, 1));
    }

    #[test]
    fn test_swap_rejected_when_third_party_blocks() {
        let widgets = vec![
            widget("big", 5, 1, 2, 2),
            widget("small", 1, 1, 2, 1),
            widget("third", 1, 2, 1, 1),
        ];
        let out = resolve(&widgets, "big", GridRect::at(1, 1, 2, 2), GridBounds::new(8, 20));
        assert!(out.iter().all(|s| s.kind != ResolutionKind::Swap));
    }

    #[test]
    fn test_full_grid_rejects() {
        let widgets = vec![widget("wall", 1, 1, 4, 4), widget("floor", 1, 5, 4, 1)];
        let out = resolve(&widgets, "new", GridRect::at(1, 4, 4, 1), GridBounds::new(4, 5));
        // pushing the wall would leave the grid and no free 4x1 slot remains
        assert!(out.is_empty());
    }

    #[test]
    fn test_apply_commits_planned_moves() {
        let mut widgets = vec![widget("big", 5, 1, 2, 2), widget("small", 1, 1, 2, 1)];
        let out = resolve(&widgets, "big", GridRect::at(1, 1, 2, 2), GridBounds::new(8, 20));
        let swap = out.iter().find(|s| s.kind == ResolutionKind::Swap).unwrap().clone();

        let moves = CollisionResolver::default().apply(&swap, &mut widgets);
        assert_eq!(moves.len(), 2);
        assert_eq!(widgets[0].position, GridRect::at(1, 1, 2, 2));
        assert_eq!(widgets[1].position, GridRect::at(5, 1, 2, 1));
    }
}
