use seed::{prelude::*, *};
use serde_wasm_bindgen::to_value;
use shared::{RankError, ReferencePoint, TrailListResponse, TrailRecord};
use wasm_bindgen::prelude::{JsValue, wasm_bindgen};

pub mod details;
pub mod map_state;

use details::trail_detail_rows;
use map_state::{MapViewState, distance_label};

const NEARBY_COUNT: usize = 3;
const NOTIFICATION_MS: u32 = 3_000;

#[wasm_bindgen(module = "/leaflet_map.js")]
extern "C" {
    #[wasm_bindgen(js_name = initMap)]
    fn init_map();
    #[wasm_bindgen(js_name = renderMarkers)]
    fn render_markers_js(markers: JsValue);
    #[wasm_bindgen(js_name = fitBounds)]
    fn fit_bounds_js(bounds: JsValue);
    #[wasm_bindgen(js_name = setView)]
    fn set_view_js(focus: JsValue);
    #[wasm_bindgen(js_name = openPopupAt)]
    fn open_popup_at(lat: f64, lng: f64);
    #[wasm_bindgen(js_name = refreshMapSize)]
    fn refresh_map_size();
}

fn api_root() -> String {
    if let Some(url) = option_env!("FRONTEND_API_ROOT") {
        return url.trim_end_matches('/').to_string();
    }
    "http://localhost:3000/api".to_string()
}

pub struct Model {
    page: Page,
    trails: Vec<TrailRecord>,
    map: MapViewState,
    pending: bool,
    notification: Option<Notification>,
    notification_seq: u32,
    details: Option<TrailRecord>,
}

impl Model {
    fn new() -> Self {
        Self {
            page: Page::Home,
            trails: Vec::new(),
            map: MapViewState::new(ReferencePoint::default()),
            pending: false,
            notification: None,
            notification_seq: 0,
            details: None,
        }
    }

    /// Marks a trail list request as in flight. Returns false while one
    /// already is, so repeated clicks do not stack requests.
    fn begin_fetch(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    fn apply_trail_list(&mut self, response: TrailListResponse) {
        self.pending = false;
        self.map.set_reference(response.reference);
        self.trails = response.trails;
        self.map.show_trails(&self.trails);
    }

    fn push_notification(&mut self, level: NotificationLevel, text: String) -> u32 {
        self.notification_seq = self.notification_seq.wrapping_add(1);
        let id = self.notification_seq;
        self.notification = Some(Notification { id, level, text });
        id
    }

    /// A newer notification outlives the timer of an older one.
    fn dismiss_notification(&mut self, id: u32) {
        if self.notification.as_ref().is_some_and(|note| note.id == id) {
            self.notification = None;
        }
    }

    fn show_nearby(&mut self) -> Result<(), RankError> {
        let ranked = shared::nearest(&self.trails, self.map.reference(), NEARBY_COUNT)?;
        self.map.show_ranked(ranked);
        Ok(())
    }

    fn sort_by_distance(&mut self) -> Result<(), RankError> {
        let ranked = shared::sort_by_distance(&self.trails, self.map.reference())?;
        self.map.show_ranked(ranked);
        Ok(())
    }

    /// Opens the details panel from the loaded list. Returns false when the
    /// trail is not loaded and has to be fetched.
    fn open_details(&mut self, id: u32) -> bool {
        match self.trails.iter().find(|trail| trail.id == id) {
            Some(trail) => {
                self.details = Some(trail.clone());
                true
            }
            None => false,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Page {
    Home,
    Map,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum NotificationLevel {
    Info,
    Error,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Notification {
    id: u32,
    level: NotificationLevel,
    text: String,
}

pub enum Msg {
    ShowPage(Page),
    ShowAllTrails,
    ShowNearbyTrails,
    SortByDistance,
    LocateMe,
    CenterOnTrail(u32),
    ShowTrailDetails(u32),
    CloseTrailDetails,
    TrailsFetched(Result<TrailListResponse, String>),
    TrailDetailsFetched(Result<TrailRecord, String>),
    DismissNotification(u32),
}

pub fn init(_: Url, orders: &mut impl Orders<Msg>) -> Model {
    orders
        .after_next_render(|_| init_map())
        .perform_cmd(fetch_trails());

    let mut model = Model::new();
    model.begin_fetch();
    model
}

pub fn update(msg: Msg, model: &mut Model, orders: &mut impl Orders<Msg>) {
    match msg {
        Msg::ShowPage(page) => {
            model.page = page;
            if page == Page::Map {
                // Leaflet measures its container, which was hidden until now.
                orders.after_next_render(|_| refresh_map_size());
            }
        }
        Msg::ShowAllTrails => {
            if model.begin_fetch() {
                orders.perform_cmd(fetch_trails());
            }
        }
        Msg::TrailsFetched(Ok(response)) => {
            model.apply_trail_list(response);
            push_map_state(&model.map);
        }
        Msg::TrailsFetched(Err(err)) => {
            model.pending = false;
            web_sys::console::error_1(&format!("[frontend] loading trails failed: {err}").into());
            notify(
                model,
                orders,
                NotificationLevel::Error,
                "Could not load trails".into(),
            );
        }
        Msg::ShowNearbyTrails => match model.show_nearby() {
            Ok(()) => push_map_state(&model.map),
            Err(err) => notify(model, orders, NotificationLevel::Error, err.to_string()),
        },
        Msg::SortByDistance => match model.sort_by_distance() {
            Ok(()) => push_map_state(&model.map),
            Err(err) => notify(model, orders, NotificationLevel::Error, err.to_string()),
        },
        Msg::LocateMe => {
            model.map.locate_reference();
            push_focus(&model.map);
            let text = format!("Located at {}", model.map.reference().name);
            notify(model, orders, NotificationLevel::Info, text);
        }
        Msg::CenterOnTrail(id) => {
            if model.map.center_on_trail(id) {
                push_focus(&model.map);
                let focus = model.map.focus();
                open_popup_at(focus.lat, focus.lng);
            }
        }
        Msg::ShowTrailDetails(id) => {
            if !model.open_details(id) {
                orders.perform_cmd(fetch_trail(id));
            }
        }
        Msg::CloseTrailDetails => model.details = None,
        Msg::TrailDetailsFetched(Ok(trail)) => model.details = Some(trail),
        Msg::TrailDetailsFetched(Err(err)) => {
            web_sys::console::error_1(&format!("[frontend] loading trail failed: {err}").into());
            notify(
                model,
                orders,
                NotificationLevel::Error,
                "Could not load trail details".into(),
            );
        }
        Msg::DismissNotification(id) => model.dismiss_notification(id),
    }
}

fn notify(
    model: &mut Model,
    orders: &mut impl Orders<Msg>,
    level: NotificationLevel,
    text: String,
) {
    let id = model.push_notification(level, text);
    orders.perform_cmd(cmds::timeout(NOTIFICATION_MS, move || {
        Msg::DismissNotification(id)
    }));
}

async fn fetch_trails() -> Msg {
    let url = format!("{}/trails", api_root());
    web_sys::console::debug_1(&format!("[frontend] fetching {url}").into());
    let response = match Request::new(url).method(Method::Get).fetch().await {
        Err(err) => Err(format!("{err:?}")),
        Ok(raw) => match raw.check_status() {
            Err(status_err) => Err(format!("{status_err:?}")),
            Ok(resp) => match resp.json::<TrailListResponse>().await {
                Ok(list) => Ok(list),
                Err(err) => Err(format!("{err:?}")),
            },
        },
    };

    Msg::TrailsFetched(response)
}

async fn fetch_trail(id: u32) -> Msg {
    let url = format!("{}/trails/{id}", api_root());
    let response = match Request::new(url).method(Method::Get).fetch().await {
        Err(err) => Err(format!("{err:?}")),
        Ok(raw) => match raw.check_status() {
            Err(status_err) => Err(format!("{status_err:?}")),
            Ok(resp) => match resp.json::<TrailRecord>().await {
                Ok(trail) => Ok(trail),
                Err(err) => Err(format!("{err:?}")),
            },
        },
    };

    Msg::TrailDetailsFetched(response)
}

fn push_map_state(map: &MapViewState) {
    if let Ok(value) = to_value(&map.markers()) {
        render_markers_js(value);
    }
    match map.bounds() {
        Some(bounds) => {
            if let Ok(value) = to_value(&bounds) {
                fit_bounds_js(value);
            }
        }
        None => push_focus(map),
    }
}

fn push_focus(map: &MapViewState) {
    if let Ok(value) = to_value(&map.focus()) {
        set_view_js(value);
    }
}

pub fn view(model: &Model) -> Node<Msg> {
    div![
        C!["app-container"],
        view_nav(model.page),
        IF!(model.page == Page::Home => view_home(model)),
        view_map_page(model),
        model.notification.as_ref().map(view_notification),
    ]
}

fn view_nav(current: Page) -> Node<Msg> {
    let link = |page: Page, label: &str| {
        button![
            C!["nav-link", IF!(page == current => "active")],
            label,
            ev(Ev::Click, move |event| {
                event.prevent_default();
                Msg::ShowPage(page)
            }),
        ]
    };

    nav![
        C!["nav"],
        span![C!["brand"], "Dongguan Hiking Trails"],
        link(Page::Home, "Home"),
        link(Page::Map, "Map"),
    ]
}

fn view_home(model: &Model) -> Node<Msg> {
    div![
        C!["home"],
        h1!["Find a trail near you"],
        p![format!(
            "{} trails around {}, from city parks to the highest peak in Dongguan.",
            model.trails.len(),
            model.map.reference().name
        )],
        button![
            C!["cta"],
            "Open the map",
            ev(Ev::Click, |_| Msg::ShowPage(Page::Map)),
        ],
    ]
}

// The map container is always rendered so Leaflet keeps its DOM node.
fn view_map_page(model: &Model) -> Node<Msg> {
    let control = |label: &str, msg: fn() -> Msg| {
        button![C!["map-control"], label, ev(Ev::Click, move |_| msg())]
    };

    div![
        C!["map-page", IF!(model.page != Page::Map => "hidden")],
        div![
            C!["map-controls"],
            control("Show all trails", || Msg::ShowAllTrails),
            control("Nearby trails", || Msg::ShowNearbyTrails),
            control("Sort by distance", || Msg::SortByDistance),
            control("My location", || Msg::LocateMe),
            span![
                C!["route-count"],
                format!("{} routes", model.map.route_count())
            ],
        ],
        div![id!["map"]],
        model.details.as_ref().map(view_trail_details),
        view_trail_list(model),
    ]
}

fn view_trail_list(model: &Model) -> Node<Msg> {
    if model.pending && model.map.displayed().is_empty() {
        return p![C!["no-trails"], "Loading trails..."];
    }
    if model.map.displayed().is_empty() {
        return p![C!["no-trails"], "No trails to show"];
    }

    ul![
        C!["trail-list"],
        model.map.displayed().iter().map(|shown| {
            let id = shown.trail.id;
            li![
                C!["trail-item"],
                h4![shown.trail.name.as_str()],
                p![strong!["Difficulty: "], shown.trail.difficulty.as_str()],
                p![strong!["Features: "], shown.trail.features_label()],
                span![C!["trail-distance"], distance_label(shown.distance_km)],
                button![
                    C!["trail-details-button"],
                    "Details",
                    ev(Ev::Click, move |event| {
                        // Keep the list item from also re-centering the map.
                        event.stop_propagation();
                        Msg::ShowTrailDetails(id)
                    }),
                ],
                ev(Ev::Click, move |_| Msg::CenterOnTrail(id)),
            ]
        })
    ]
}

fn view_trail_details(trail: &TrailRecord) -> Node<Msg> {
    section![
        C!["trail-details"],
        div![
            C!["trail-details-header"],
            h3![trail.name.as_str()],
            button![
                C!["close"],
                "Close",
                ev(Ev::Click, |_| Msg::CloseTrailDetails),
            ],
        ],
        dl![trail_detail_rows(trail)
            .into_iter()
            .flat_map(|(label, value)| [dt![label], dd![value]])
            .collect::<Vec<Node<Msg>>>()],
    ]
}

fn view_notification(note: &Notification) -> Node<Msg> {
    let class = match note.level {
        NotificationLevel::Info => "info",
        NotificationLevel::Error => "error",
    };
    div![C!["notification", class], note.text.as_str()]
}

#[wasm_bindgen(start)]
pub fn start() {
    App::start("app", init, update, view);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trail(id: u32, name: &str, lat: f64, lng: f64) -> TrailRecord {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": name,
            "difficulty": "Beginner",
            "lat": lat,
            "lng": lng
        }))
        .unwrap()
    }

    fn loaded(reference: ReferencePoint) -> Model {
        let mut model = Model::new();
        assert!(model.begin_fetch());
        model.apply_trail_list(TrailListResponse {
            reference,
            trails: vec![
                trail(1, "A", 23.02, 113.75),
                trail(2, "B", 22.99, 113.74),
                trail(3, "C", 23.10, 113.80),
            ],
        });
        model
    }

    fn displayed_names(model: &Model) -> Vec<&str> {
        model
            .map
            .displayed()
            .iter()
            .map(|shown| shown.trail.name.as_str())
            .collect()
    }

    #[test]
    fn test_api_root_has_no_trailing_slash() {
        assert!(!api_root().ends_with('/'));
    }

    #[test]
    fn test_trail_list_payload_parses() {
        let payload = r#"{
            "reference": {"name": "Xiangmang East Road, Dongguan", "lat": 22.9907, "lng": 113.7378},
            "trails": [
                {"id": 6, "title_ignored": true, "name": "Huangqi", "difficulty": "Beginner",
                 "features": "city centre, night views", "lat": 23.02, "lng": 113.76}
            ]
        }"#;
        let list: TrailListResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(list.trails[0].features, vec!["city centre, night views"]);

        let mut map = MapViewState::new(list.reference);
        map.show_trails(&list.trails);
        assert_eq!(map.markers().len(), 2);
    }

    #[test]
    fn test_show_all_trails_is_gated_while_pending() {
        let mut model = Model::new();
        assert!(model.begin_fetch());
        assert!(!model.begin_fetch());

        model.apply_trail_list(TrailListResponse {
            reference: ReferencePoint::default(),
            trails: Vec::new(),
        });
        assert!(model.begin_fetch());
    }

    #[test]
    fn test_only_latest_notification_is_dismissed_by_its_timer() {
        let mut model = Model::new();
        let first = model.push_notification(NotificationLevel::Info, "Located".into());
        let second = model.push_notification(NotificationLevel::Error, "Failed".into());
        assert_ne!(first, second);

        // The older timer fires while the newer notification is showing.
        model.dismiss_notification(first);
        assert_eq!(
            model.notification.as_ref().map(|note| note.text.as_str()),
            Some("Failed")
        );

        model.dismiss_notification(second);
        assert_eq!(model.notification, None);
    }

    #[test]
    fn test_nearby_ranks_against_server_reference() {
        let mut from_default = loaded(ReferencePoint::default());
        from_default.show_nearby().unwrap();
        assert_eq!(displayed_names(&from_default), vec!["B", "A", "C"]);

        // Standing on C flips the order the default reference would give.
        let mut model = loaded(ReferencePoint::new("Summit", 23.10, 113.80));
        model.show_nearby().unwrap();
        assert_eq!(displayed_names(&model), vec!["C", "A", "B"]);
        assert!(model.map.displayed()[0].distance_km.unwrap() < 1e-6);
    }

    #[test]
    fn test_sort_by_distance_keeps_every_mappable_trail() {
        let mut model = loaded(ReferencePoint::new("Summit", 23.10, 113.80));
        model.trails.push(trail(4, "Nowhere", 91.0, 113.75));
        model.sort_by_distance().unwrap();
        assert_eq!(displayed_names(&model), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_invalid_server_reference_reports_rank_error() {
        let mut model = loaded(ReferencePoint::new("Off", 95.0, 113.0));
        assert!(matches!(
            model.show_nearby(),
            Err(RankError::InvalidReference { .. })
        ));
    }

    #[test]
    fn test_details_open_from_loaded_trails() {
        let mut model = loaded(ReferencePoint::default());
        assert!(model.open_details(2));
        assert_eq!(model.details.as_ref().map(|t| t.name.as_str()), Some("B"));
        assert!(!model.open_details(42));
    }
}
