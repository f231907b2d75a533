//! The ordered list of steps a user edits before publishing a recipe.
//!
//! Positions are implicit: a step's sequence number is its index in the
//! list at publish time, so nothing here stores one. Out-of-range indices
//! are ignored rather than treated as errors, which keeps every operation
//! safe to drive directly from UI events.

use uuid::Uuid;

use crate::image::{PreviewRef, RawImage};

/// Stable identity of a step across reorders.
pub type StepId = Uuid;

/// One editable step.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub id: StepId,
    /// A freshly picked photo that still has to be normalized and uploaded.
    pub image: Option<RawImage>,
    /// Local preview of `image`.
    pub preview: Option<PreviewRef>,
    /// URL of a photo that is already stored.
    pub image_url: Option<String>,
    pub description: String,
}

impl Step {
    /// An empty step with a fresh id.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            image: None,
            preview: None,
            image_url: None,
            description: String::new(),
        }
    }

    /// A step seeded from an already persisted step record.
    pub fn existing(id: StepId, image_url: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id,
            image: None,
            preview: None,
            image_url: Some(image_url.into()),
            description: description.unwrap_or_default(),
        }
    }

    /// Whether the step will have an image URL once uploads are done.
    pub fn has_image(&self) -> bool {
        self.image.is_some() || self.stored_url().is_some()
    }

    /// The stored URL, ignoring empty strings.
    pub fn stored_url(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|url| !url.is_empty())
    }

    /// What the editor should show: a pending preview wins over the stored URL.
    pub fn display_source(&self) -> Option<&str> {
        self.preview
            .as_ref()
            .map(PreviewRef::as_str)
            .or_else(|| self.stored_url())
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::new()
    }
}

/// Fields to merge into a step. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct StepPatch {
    pub description: Option<String>,
    pub image: Option<RawImage>,
    pub image_url: Option<String>,
}

impl StepPatch {
    pub fn description(text: impl Into<String>) -> Self {
        Self {
            description: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn image(raw: RawImage) -> Self {
        Self {
            image: Some(raw),
            ..Self::default()
        }
    }
}

/// Ordered, mutable collection of [`Step`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepList {
    steps: Vec<Step>,
}

impl StepList {
    pub fn new() -> Self {
        Self::default()
    }

    /// A list holding a single empty step, the starting point of a new recipe.
    pub fn with_blank_step() -> Self {
        Self {
            steps: vec![Step::new()],
        }
    }

    /// Build a list from steps already in display order. An empty input
    /// yields a single blank step so the editor always has a row.
    pub fn from_steps(steps: Vec<Step>) -> Self {
        if steps.is_empty() {
            Self::with_blank_step()
        } else {
            Self { steps }
        }
    }

    /// Append an empty step and return its id.
    pub fn insert(&mut self) -> StepId {
        let step = Step::new();
        let id = step.id;
        self.steps.push(step);
        id
    }

    /// Remove the step at `index`. Out of range is a no-op returning `None`.
    pub fn remove(&mut self, index: usize) -> Option<Step> {
        (index < self.steps.len()).then(|| self.steps.remove(index))
    }

    /// Merge `patch` into the step at `index`.
    ///
    /// Attaching an image also derives its preview; the stored URL is kept
    /// until the new image is uploaded. Returns `false` when out of range.
    pub fn update(&mut self, index: usize, patch: StepPatch) -> bool {
        let Some(step) = self.steps.get_mut(index) else {
            return false;
        };

        if let Some(description) = patch.description {
            step.description = description;
        }
        if let Some(raw) = patch.image {
            step.preview = Some(PreviewRef::for_image(&raw));
            step.image = Some(raw);
        }
        if let Some(url) = patch.image_url {
            step.image_url = Some(url);
        }
        true
    }

    /// Move the step at `from` to `to`, shifting the steps in between.
    /// Returns `false` (and changes nothing) if either index is out of range.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.steps.len();
        if from >= len || to >= len {
            return false;
        }
        let step = self.steps.remove(from);
        self.steps.insert(to, step);
        true
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    pub fn as_slice(&self) -> &[Step] {
        &self.steps
    }

    /// Current index of the step with `id`.
    pub fn position(&self, id: StepId) -> Option<usize> {
        self.steps.iter().position(|s| s.id == id)
    }

    /// Whether at least one step carries (or will carry) an image.
    pub fn has_image_step(&self) -> bool {
        self.steps.iter().any(Step::has_image)
    }
}

impl<'a> IntoIterator for &'a StepList {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &StepList) -> Vec<StepId> {
        list.iter().map(|s| s.id).collect()
    }

    fn list_of(n: usize) -> StepList {
        let mut list = StepList::new();
        for _ in 0..n {
            list.insert();
        }
        list
    }

    #[test]
    fn insert_appends_blank_step_with_unique_id() {
        let mut list = StepList::new();
        let a = list.insert();
        let b = list.insert();
        assert_ne!(a, b);
        assert_eq!(ids(&list), vec![a, b]);
        assert_eq!(list.get(1).unwrap().description, "");
        assert!(!list.get(1).unwrap().has_image());
    }

    #[test]
    fn blank_list_starts_with_one_step() {
        assert_eq!(StepList::with_blank_step().len(), 1);
        assert_eq!(StepList::from_steps(Vec::new()).len(), 1);
    }

    #[test]
    fn remove_takes_step_out() {
        let mut list = list_of(3);
        let before = ids(&list);
        let removed = list.remove(1).unwrap();
        assert_eq!(removed.id, before[1]);
        assert_eq!(ids(&list), vec![before[0], before[2]]);
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let mut list = list_of(2);
        let before = ids(&list);
        assert!(list.remove(2).is_none());
        assert_eq!(ids(&list), before);
    }

    #[test]
    fn update_merges_only_given_fields() {
        let mut list = StepList::new();
        list.insert();
        assert!(list.update(0, StepPatch::image(RawImage::new(vec![1u8, 2, 3]))));
        assert!(list.update(0, StepPatch::description("knead")));

        let step = list.get(0).unwrap();
        assert_eq!(step.description, "knead");
        assert!(step.image.is_some());
        assert!(step.preview.is_some());
    }

    #[test]
    fn attaching_image_keeps_stored_url_but_previews_new_one() {
        let id = Uuid::new_v4();
        let mut list = StepList::from_steps(vec![Step::existing(
            id,
            "https://cdn/old.jpg",
            Some("boil".into()),
        )]);
        assert_eq!(list.get(0).unwrap().display_source(), Some("https://cdn/old.jpg"));

        list.update(0, StepPatch::image(RawImage::new(vec![9u8; 4])));
        let step = list.get(0).unwrap();
        assert_eq!(step.image_url.as_deref(), Some("https://cdn/old.jpg"));
        assert!(step.display_source().unwrap().starts_with("preview:"));
        assert_eq!(step.description, "boil");
    }

    #[test]
    fn update_out_of_range_is_noop() {
        let mut list = list_of(1);
        assert!(!list.update(5, StepPatch::description("x")));
        assert_eq!(list.get(0).unwrap().description, "");
    }

    #[test]
    fn reorder_moves_forward() {
        let mut list = list_of(4);
        let b = ids(&list);
        assert!(list.reorder(0, 2));
        assert_eq!(ids(&list), vec![b[1], b[2], b[0], b[3]]);
    }

    #[test]
    fn reorder_moves_backward() {
        let mut list = list_of(4);
        let b = ids(&list);
        assert!(list.reorder(3, 1));
        assert_eq!(ids(&list), vec![b[0], b[3], b[1], b[2]]);
    }

    #[test]
    fn reorder_same_index_is_identity() {
        let mut list = list_of(3);
        let b = ids(&list);
        assert!(list.reorder(1, 1));
        assert_eq!(ids(&list), b);
    }

    #[test]
    fn reorder_out_of_range_is_noop() {
        let mut list = list_of(3);
        let b = ids(&list);
        assert!(!list.reorder(0, 3));
        assert!(!list.reorder(7, 0));
        assert_eq!(ids(&list), b);
    }

    #[test]
    fn ids_follow_steps_across_reorders() {
        let mut list = list_of(3);
        let target = list.get(0).unwrap().id;
        list.reorder(0, 2);
        assert_eq!(list.position(target), Some(2));
    }

    #[test]
    fn empty_stored_url_does_not_count_as_image() {
        let mut step = Step::new();
        step.image_url = Some(String::new());
        assert!(!step.has_image());
        assert!(step.display_source().is_none());
    }

    #[test]
    fn has_image_step_detects_any_photo() {
        let mut list = list_of(2);
        assert!(!list.has_image_step());
        list.update(1, StepPatch::image(RawImage::new(vec![0u8])));
        assert!(list.has_image_step());
    }
}
