//! Album/EP extraction from the search provider's rendering tree
//!
//! The response is an internal UI tree, not an API contract. Shelves of
//! unrelated renderers (ads, songs, promoted cards) are interleaved with the
//! ones we want, so every hop is optional: a missing key or a value of the
//! wrong shape drops that branch and the walk moves on to its siblings.

use serde_json::Value;

use super::types::SearchResult;

const ACCEPTED_ITEM_TYPES: [&str; 2] = ["Album", "EP"];

const TITLE_COLUMN: usize = 0;
const SUBTITLE_COLUMN: usize = 1;
/// Subtitle runs read `"<Type>", " • ", "<Artist>", ...`
const ITEM_TYPE_RUN: usize = 0;
const ARTIST_RUN: usize = 2;

/// Borrowed view of one JSON node. Every accessor returns `None` on a shape
/// mismatch instead of failing.
#[derive(Clone, Copy)]
struct Node<'a>(&'a Value);

impl<'a> Node<'a> {
    fn key(self, name: &str) -> Option<Node<'a>> {
        self.0.as_object()?.get(name).map(Node)
    }

    fn path(self, names: &[&str]) -> Option<Node<'a>> {
        names.iter().try_fold(self, |node, name| node.key(name))
    }

    /// Array elements under `name`; empty when absent or not an array.
    fn list(self, name: &str) -> impl Iterator<Item = Node<'a>> {
        self.key(name)
            .and_then(|node| node.0.as_array())
            .into_iter()
            .flatten()
            .map(Node)
    }

    fn index(self, i: usize) -> Option<Node<'a>> {
        self.0.as_array()?.get(i).map(Node)
    }

    fn str(self) -> Option<&'a str> {
        self.0.as_str()
    }
}

/// Walks `document` and returns every album/EP list item in shelf order.
///
/// Total: never fails, an unrecognised document yields an empty vector.
pub fn extract(document: &Value) -> Vec<SearchResult> {
    let root = Node(document);

    let Some(tabbed) = root.path(&["contents", "tabbedSearchResultsRenderer"]) else {
        tracing::debug!("search response has no tabbed results");
        return Vec::new();
    };

    tabbed
        .list("tabs")
        .filter_map(|tab| tab.path(&["tabRenderer", "content", "sectionListRenderer"]))
        .flat_map(|section_list| section_list.list("contents"))
        .filter_map(|section| section.key("musicShelfRenderer"))
        .flat_map(|shelf| shelf.list("contents"))
        .filter_map(|item| item.key("musicResponsiveListItemRenderer"))
        .filter_map(parse_list_item)
        .collect()
}

fn parse_list_item(renderer: Node<'_>) -> Option<SearchResult> {
    let item_type = column_text(renderer, SUBTITLE_COLUMN, ITEM_TYPE_RUN)?;
    if !ACCEPTED_ITEM_TYPES.contains(&item_type) {
        tracing::trace!(item_type, "skipping non-album item");
        return None;
    }

    let album = column_text(renderer, TITLE_COLUMN, 0).unwrap_or_default();
    let artist = column_text(renderer, SUBTITLE_COLUMN, ARTIST_RUN).unwrap_or_default();
    if album.is_empty() || artist.is_empty() {
        return None;
    }

    Some(SearchResult {
        artist: artist.to_string(),
        album: album.to_string(),
        playlist_id: playlist_id(renderer).unwrap_or_default().to_string(),
    })
}

/// Text of run `run` in flex column `column` of a list item renderer.
fn column_text<'a>(renderer: Node<'a>, column: usize, run: usize) -> Option<&'a str> {
    renderer
        .key("flexColumns")?
        .index(column)?
        .path(&["musicResponsiveListItemFlexColumnRenderer", "text"])?
        .key("runs")?
        .index(run)?
        .key("text")?
        .str()
}

fn playlist_id<'a>(renderer: Node<'a>) -> Option<&'a str> {
    renderer
        .path(&[
            "overlay",
            "musicItemThumbnailOverlayRenderer",
            "content",
            "musicPlayButtonRenderer",
            "playNavigationEndpoint",
            "watchPlaylistEndpoint",
            "playlistId",
        ])?
        .str()
}
