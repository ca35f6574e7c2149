use gloo_net::http::Request;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{MouseEvent, RequestCredentials};
use yew::prelude::*;

const INPUT_CLASS: &str = "p-2 border border-slate-300 rounded bg-white text-sm";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum TableName {
    Spending,
    Expenses,
    Goals,
    Debt,
    Income,
}

impl TableName {
    fn as_str(self) -> &'static str {
        match self {
            TableName::Spending => "spending",
            TableName::Expenses => "expenses",
            TableName::Goals => "goals",
            TableName::Debt => "debt",
            TableName::Income => "income",
        }
    }

    fn title(self) -> &'static str {
        match self {
            TableName::Spending => "Spending",
            TableName::Expenses => "Expenses",
            TableName::Goals => "Goals",
            TableName::Debt => "Debt",
            TableName::Income => "Income",
        }
    }

    fn from_segment(segment: &str) -> Option<TableName> {
        match segment {
            "myspending" => Some(TableName::Spending),
            "myexpenses" => Some(TableName::Expenses),
            "mygoals" => Some(TableName::Goals),
            "mydebt" => Some(TableName::Debt),
            "myincome" => Some(TableName::Income),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct DateCursor {
    year: i32,
    month: u32,
    day: u32,
}

impl DateCursor {
    // trailing URL segment, "2024-3-15" or "2024-3" with the day left off
    fn parse(segment: &str) -> Option<DateCursor> {
        let mut parts = segment.split('-');
        let year = parts.next()?.parse::<i32>().ok()?;
        let month = parts.next()?.parse::<u32>().ok()?;
        let day = match parts.next() {
            Some(part) => part.parse::<u32>().ok()?,
            None => 1,
        };
        if parts.next().is_some() {
            return None;
        }
        if year < 1 || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return None;
        }
        Some(DateCursor { year, month, day })
    }

    // moving between months always lands on the 1st
    fn prev_month(self) -> DateCursor {
        if self.month == 1 {
            DateCursor {
                year: self.year - 1,
                month: 12,
                day: 1,
            }
        } else {
            DateCursor {
                year: self.year,
                month: self.month - 1,
                day: 1,
            }
        }
    }

    fn next_month(self) -> DateCursor {
        if self.month == 12 {
            DateCursor {
                year: self.year + 1,
                month: 1,
                day: 1,
            }
        } else {
            DateCursor {
                year: self.year,
                month: self.month + 1,
                day: 1,
            }
        }
    }

    fn path_segment(self) -> String {
        format!("{}-{}-{}", self.year, self.month, self.day)
    }
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "",
    }
}

fn today() -> DateCursor {
    let now = js_sys::Date::new_0();
    DateCursor {
        year: now.get_full_year() as i32,
        month: now.get_month() + 1,
        day: now.get_date(),
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
struct PageContext {
    table: TableName,
    cursor: DateCursor,
}

// unknown pages fall back to the spending table
fn parse_page_context(path: &str, today: DateCursor) -> PageContext {
    let mut segments = path.split('/').filter(|segment| !segment.is_empty());
    let table = segments
        .next()
        .and_then(TableName::from_segment)
        .unwrap_or(TableName::Spending);
    let cursor = segments.next().and_then(DateCursor::parse).unwrap_or(today);
    PageContext { table, cursor }
}

fn page_context_from_location() -> PageContext {
    let path = web_sys::window()
        .map(|window| window.location())
        .and_then(|location| location.pathname().ok())
        .unwrap_or_default();
    parse_page_context(&path, today())
}

fn month_path(table: TableName, cursor: DateCursor) -> String {
    format!("/my{}/{}", table.as_str(), cursor.path_segment())
}

fn redirect_to(path: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.location().set_href(path);
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum FormKind {
    Spending,
    Expense,
    Debt,
    Goal,
    Income,
    Import,
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum FieldKind {
    Text,
    Number,
    Date,
    Hidden(&'static str),
    File,
    Select(&'static [(&'static str, &'static str)]),
}

#[derive(Clone, Copy, PartialEq)]
struct FieldSpec {
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
    placeholder: &'static str,
    required: bool,
}

const REPEAT_OPTIONS: &[(&str, &str)] = &[("once", "Once"), ("monthly", "Monthly")];

const IMPORT_TABLE_OPTIONS: &[(&str, &str)] = &[
    ("spending", "Import Spending Data"),
    ("expenses", "Import Expense Data"),
    ("goals", "Import Goal Data"),
    ("debt", "Import Debt Data"),
    ("income", "Import Income Data"),
];

const SPENDING_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "name",
        label: "Name",
        kind: FieldKind::Text,
        placeholder: "groceries",
        required: true,
    },
    FieldSpec {
        name: "amount",
        label: "Amount",
        kind: FieldKind::Number,
        placeholder: "64.65",
        required: true,
    },
    FieldSpec {
        name: "category",
        label: "Category",
        kind: FieldKind::Text,
        placeholder: "food (optional)",
        required: false,
    },
    FieldSpec {
        name: "owner",
        label: "Owner",
        kind: FieldKind::Text,
        placeholder: "John (optional)",
        required: false,
    },
    FieldSpec {
        name: "date",
        label: "Date",
        kind: FieldKind::Date,
        placeholder: "",
        required: false,
    },
    FieldSpec {
        name: "linkedExpense",
        label: "Linked Expense",
        kind: FieldKind::Text,
        placeholder: "rent (optional)",
        required: false,
    },
];

const EXPENSE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "name",
        label: "Name",
        kind: FieldKind::Text,
        placeholder: "rent",
        required: true,
    },
    FieldSpec {
        name: "expected",
        label: "Expected Amount",
        kind: FieldKind::Number,
        placeholder: "800",
        required: true,
    },
    FieldSpec {
        name: "repeat",
        label: "Repeat",
        kind: FieldKind::Select(REPEAT_OPTIONS),
        placeholder: "",
        required: true,
    },
    FieldSpec {
        name: "category",
        label: "Category",
        kind: FieldKind::Text,
        placeholder: "housing (optional)",
        required: false,
    },
    FieldSpec {
        name: "owner",
        label: "Owner",
        kind: FieldKind::Text,
        placeholder: "John (optional)",
        required: false,
    },
    FieldSpec {
        name: "date",
        label: "Due Date",
        kind: FieldKind::Date,
        placeholder: "",
        required: false,
    },
];

const DEBT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "name",
        label: "Name",
        kind: FieldKind::Text,
        placeholder: "school loans",
        required: true,
    },
    FieldSpec {
        name: "amount",
        label: "Amount",
        kind: FieldKind::Number,
        placeholder: "100",
        required: true,
    },
    FieldSpec {
        name: "owner",
        label: "Owner",
        kind: FieldKind::Text,
        placeholder: "John (optional)",
        required: false,
    },
    FieldSpec {
        name: "date",
        label: "Payoff Date",
        kind: FieldKind::Date,
        placeholder: "",
        required: false,
    },
];

const GOAL_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "name",
        label: "Name",
        kind: FieldKind::Text,
        placeholder: "new bike",
        required: true,
    },
    FieldSpec {
        name: "target",
        label: "Target Amount",
        kind: FieldKind::Number,
        placeholder: "100",
        required: true,
    },
    FieldSpec {
        name: "amount",
        label: "",
        kind: FieldKind::Hidden("0"),
        placeholder: "",
        required: true,
    },
    FieldSpec {
        name: "owner",
        label: "Owner",
        kind: FieldKind::Text,
        placeholder: "John (optional)",
        required: false,
    },
    FieldSpec {
        name: "date",
        label: "Target Date",
        kind: FieldKind::Date,
        placeholder: "",
        required: false,
    },
];

const INCOME_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "name",
        label: "Name",
        kind: FieldKind::Text,
        placeholder: "paycheck",
        required: true,
    },
    FieldSpec {
        name: "amount",
        label: "Amount",
        kind: FieldKind::Number,
        placeholder: "400",
        required: true,
    },
    FieldSpec {
        name: "type",
        label: "Type",
        kind: FieldKind::Text,
        placeholder: "active / passive",
        required: false,
    },
    FieldSpec {
        name: "category",
        label: "Category",
        kind: FieldKind::Text,
        placeholder: "salary (optional)",
        required: false,
    },
    FieldSpec {
        name: "owner",
        label: "Owner",
        kind: FieldKind::Text,
        placeholder: "John (optional)",
        required: false,
    },
    FieldSpec {
        name: "date",
        label: "Date",
        kind: FieldKind::Date,
        placeholder: "",
        required: false,
    },
];

const IMPORT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "csvfile",
        label: "File",
        kind: FieldKind::File,
        placeholder: "",
        required: true,
    },
    FieldSpec {
        name: "tablename",
        label: "Table",
        kind: FieldKind::Select(IMPORT_TABLE_OPTIONS),
        placeholder: "",
        required: true,
    },
];

impl FormKind {
    const ALL: [FormKind; 6] = [
        FormKind::Spending,
        FormKind::Expense,
        FormKind::Debt,
        FormKind::Goal,
        FormKind::Income,
        FormKind::Import,
    ];

    fn endpoint(self) -> &'static str {
        match self {
            FormKind::Spending => "/addspending",
            FormKind::Expense => "/addexpense",
            FormKind::Debt => "/adddebt",
            FormKind::Goal => "/addgoal",
            FormKind::Income => "/addincome",
            FormKind::Import => "/importcsv",
        }
    }

    fn slug(self) -> &'static str {
        match self {
            FormKind::Spending => "addspending",
            FormKind::Expense => "addexpense",
            FormKind::Debt => "adddebt",
            FormKind::Goal => "addgoal",
            FormKind::Income => "addincome",
            FormKind::Import => "import",
        }
    }

    fn trigger_label(self) -> &'static str {
        match self {
            FormKind::Spending => "Add Spending",
            FormKind::Expense => "Add Expense",
            FormKind::Debt => "Add Debt",
            FormKind::Goal => "Add Goal",
            FormKind::Income => "Add Income",
            FormKind::Import => "Import CSV",
        }
    }

    fn form_title(self) -> &'static str {
        match self {
            FormKind::Spending => "New Spending",
            FormKind::Expense => "New Expense",
            FormKind::Debt => "New Debt",
            FormKind::Goal => "New Goal",
            FormKind::Income => "New Income",
            FormKind::Import => "Import CSV Data",
        }
    }

    // the import form carries a file field and needs multipart encoding
    fn multipart(self) -> bool {
        matches!(self, FormKind::Import)
    }

    fn fields(self) -> &'static [FieldSpec] {
        match self {
            FormKind::Spending => SPENDING_FIELDS,
            FormKind::Expense => EXPENSE_FIELDS,
            FormKind::Debt => DEBT_FIELDS,
            FormKind::Goal => GOAL_FIELDS,
            FormKind::Income => INCOME_FIELDS,
            FormKind::Import => IMPORT_FIELDS,
        }
    }
}

// one overlay slot shared by every form kind; opening while one is mounted is a no-op
fn open_overlay(slot: Option<FormKind>, requested: FormKind) -> Option<FormKind> {
    match slot {
        Some(mounted) => Some(mounted),
        None => Some(requested),
    }
}

struct RequestParts {
    url: String,
    body: Option<String>,
}

fn query_string(payload: &serde_json::Value) -> String {
    match payload.as_object() {
        Some(map) => map
            .iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(text) => format!("{key}={text}"),
                other => format!("{key}={other}"),
            })
            .collect::<Vec<_>>()
            .join("&"),
        None => String::new(),
    }
}

fn request_parts(endpoint: &str, payload: &serde_json::Value, method: &str) -> RequestParts {
    if method == "GET" {
        let query = query_string(payload);
        let url = if query.is_empty() {
            endpoint.to_string()
        } else {
            format!("{endpoint}?{query}")
        };
        RequestParts { url, body: None }
    } else {
        RequestParts {
            url: endpoint.to_string(),
            body: Some(payload.to_string()),
        }
    }
}

// every resolved response is followed by a full reload; the server renders the result
async fn send(endpoint: &str, payload: &serde_json::Value, method: &str) {
    let parts = request_parts(endpoint, payload, method);
    let builder = if method == "GET" {
        Request::get(&parts.url)
    } else {
        Request::post(&parts.url)
    };
    let builder = builder.credentials(RequestCredentials::Include);

    let result = match parts.body {
        Some(body) => match builder.body(body) {
            Ok(request) => request.send().await,
            Err(err) => {
                tracing::warn!("could not build request to {}: {:?}", endpoint, err);
                return;
            }
        },
        None => builder.send().await,
    };

    match result {
        Ok(_) => {
            if let Some(window) = web_sys::window() {
                let _ = window.location().reload();
            }
        }
        Err(err) => {
            tracing::warn!("request to {} failed: {:?}", endpoint, err);
        }
    }
}

async fn get(endpoint: &str, payload: &serde_json::Value) {
    send(endpoint, payload, "GET").await
}

async fn post(endpoint: &str, payload: &serde_json::Value) {
    send(endpoint, payload, "POST").await
}

#[derive(Clone, PartialEq, Deserialize)]
struct MonthData {
    columns: Vec<String>,
    rows: Vec<TableRow>,
    total: f64,
    #[serde(default)]
    spent_total: Option<f64>,
}

#[derive(Clone, PartialEq, Deserialize)]
struct TableRow {
    id: String,
    cells: Vec<String>,
    #[serde(default)]
    details: Vec<TableRow>,
}

#[derive(Clone, PartialEq)]
struct RowMenu {
    x: i32,
    y: i32,
    row_id: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
struct AppSettings {
    currency_code: String,
    currency_symbol: String,
}

fn default_settings() -> AppSettings {
    AppSettings {
        currency_code: "USD".to_string(),
        currency_symbol: "$".to_string(),
    }
}

fn load_settings() -> AppSettings {
    if let Some(window) = web_sys::window() {
        if let Ok(Some(storage)) = window.local_storage() {
            if let Ok(Some(raw)) = storage.get_item("settings") {
                if let Ok(settings) = serde_json::from_str::<AppSettings>(&raw) {
                    return settings;
                }
            }
        }
    }
    default_settings()
}

fn save_settings(settings: &AppSettings) {
    if let Some(window) = web_sys::window() {
        if let Ok(Some(storage)) = window.local_storage() {
            if let Ok(raw) = serde_json::to_string(settings) {
                let _ = storage.set_item("settings", &raw);
            }
        }
    }
}

fn currency_symbol_for(code: &str) -> &'static str {
    match code {
        "PHP" => "₱",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        _ => "$",
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.to_string().chars().rev().collect::<Vec<char>>();
    let mut out = Vec::new();
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(*ch);
    }
    out.into_iter().rev().collect()
}

fn format_amount(amount: f64, symbol: &str) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as i64;
    format!(
        "{}{}{}.{:02}",
        sign,
        symbol,
        group_thousands(cents / 100),
        cents % 100
    )
}

#[function_component(Header)]
fn header() -> Html {
    let settings = use_context::<UseStateHandle<AppSettings>>();
    let current_code = settings
        .as_ref()
        .map(|s| s.currency_code.clone())
        .unwrap_or_else(|| "USD".to_string());

    let on_currency_change = {
        let settings = settings.clone();
        Callback::from(move |e: Event| {
            if let Some(settings) = settings.as_ref() {
                let select: web_sys::HtmlSelectElement = e.target_unchecked_into();
                let code = select.value();
                let next = AppSettings {
                    currency_symbol: currency_symbol_for(&code).to_string(),
                    currency_code: code,
                };
                save_settings(&next);
                settings.set(next);
            }
        })
    };

    html! {
        <header class="bg-white border-b border-slate-200 h-16 flex items-center justify-between px-6">
            <div class="flex items-center gap-3">
                <div class="w-9 h-9 bg-emerald-700 rounded-full flex items-center justify-center text-white">
                    { icon_wallet() }
                </div>
                <span class="text-emerald-900 text-xl font-black tracking-tight">{"GastosBro"}</span>
            </div>
            <select value={current_code} onchange={on_currency_change} class="px-3 py-1 border border-slate-300 rounded-lg text-sm bg-white">
                <option value="USD">{"USD ($)"}</option>
                <option value="PHP">{"PHP (₱)"}</option>
                <option value="EUR">{"EUR (€)"}</option>
                <option value="GBP">{"GBP (£)"}</option>
                <option value="JPY">{"JPY (¥)"}</option>
            </select>
        </header>
    }
}

fn render_field(field: &FieldSpec) -> Html {
    let required = field.required;
    let input = match field.kind {
        FieldKind::Hidden(value) => {
            return html! { <input type="hidden" name={field.name} value={value} /> };
        }
        FieldKind::Text => html! {
            <input type="text" id={field.name} name={field.name} placeholder={field.placeholder}
                required={required} class={INPUT_CLASS} />
        },
        FieldKind::Number => html! {
            <input type="number" id={field.name} name={field.name} min="1" step="any"
                placeholder={field.placeholder} required={required} class={INPUT_CLASS} />
        },
        FieldKind::Date => html! {
            <input type="date" id={field.name} name={field.name} required={required} class={INPUT_CLASS} />
        },
        FieldKind::File => html! {
            <input type="file" id={field.name} name={field.name} required={required} class={INPUT_CLASS} />
        },
        FieldKind::Select(options) => html! {
            <select id={field.name} name={field.name} required={required} class={INPUT_CLASS}>
                { for options.iter().map(|(value, label)| html! {
                    <option value={*value}>{ *label }</option>
                }) }
            </select>
        },
    };

    html! {
        <div class="flex flex-col gap-1">
            <label for={field.name} class="text-sm font-medium text-slate-700">{ field.label }</label>
            { input }
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct AddOverlayProps {
    kind: FormKind,
    on_cancel: Callback<MouseEvent>,
}

#[function_component(AddOverlay)]
fn add_overlay(props: &AddOverlayProps) -> Html {
    let kind = props.kind;

    // the form submits natively; the browser navigation replaces the page
    html! {
        <form class={format!("bg-white rounded-xl border border-slate-200 p-6 space-y-4 form-{}", kind.slug())}
            action={kind.endpoint()} method="POST"
            enctype={kind.multipart().then_some("multipart/form-data")}>
            <h3 class="font-bold text-slate-800 text-lg">{ kind.form_title() }</h3>
            <div class="grid grid-cols-1 md:grid-cols-3 gap-3">
                { for kind.fields().iter().map(render_field) }
            </div>
            <div class="flex gap-2">
                <input type="submit" value="Submit"
                    class="bg-emerald-700 text-white px-4 py-2 rounded-lg font-bold text-sm cursor-pointer hover:opacity-90" />
                <button type="button" class="px-4 py-2 rounded-lg border border-slate-300 text-sm text-slate-700 hover:bg-slate-50"
                    onclick={props.on_cancel.clone()}>
                    {"Cancel"}
                </button>
            </div>
        </form>
    }
}

#[function_component(AddControls)]
fn add_controls() -> Html {
    let overlay = use_state(|| None::<FormKind>);

    // move focus to the name field once a form is mounted; the import form has none
    {
        let open = *overlay;
        use_effect_with_deps(
            move |kind| {
                if kind.is_some() {
                    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                        if let Some(element) = document.get_element_by_id("name") {
                            if let Ok(field) = element.dyn_into::<web_sys::HtmlElement>() {
                                let _ = field.focus();
                            }
                        }
                    }
                }
                || ()
            },
            open,
        );
    }

    let on_cancel = {
        let overlay = overlay.clone();
        Callback::from(move |_| overlay.set(None))
    };

    html! {
        <>
            <div class="flex flex-wrap gap-2">
                { for FormKind::ALL.iter().map(|kind| {
                    let kind = *kind;
                    let disabled = (*overlay).is_some();
                    let onclick = {
                        let overlay = overlay.clone();
                        Callback::from(move |_| overlay.set(open_overlay(*overlay, kind)))
                    };
                    html! {
                        <button type="button"
                            class="flex items-center gap-2 bg-emerald-700 text-white px-4 py-2 rounded-xl font-bold text-sm hover:opacity-90 transition-all disabled:opacity-40"
                            disabled={disabled} onclick={onclick}>
                            { if kind == FormKind::Import { icon_upload() } else { icon_plus() } }
                            { kind.trigger_label() }
                        </button>
                    }
                }) }
            </div>
            { if let Some(kind) = *overlay {
                html! { <AddOverlay kind={kind} on_cancel={on_cancel} /> }
            } else {
                html! {}
            } }
        </>
    }
}

#[derive(Properties, PartialEq)]
struct MonthNavProps {
    ctx: PageContext,
}

#[function_component(MonthNav)]
fn month_nav(props: &MonthNavProps) -> Html {
    let table = props.ctx.table;
    let cursor = props.ctx.cursor;

    let on_prev = Callback::from(move |_| redirect_to(&month_path(table, cursor.prev_month())));
    let on_next = Callback::from(move |_| redirect_to(&month_path(table, cursor.next_month())));

    html! {
        <div class="flex items-center justify-between bg-white rounded-xl border border-slate-200 px-6 py-3">
            <button class="p-2 rounded-lg hover:bg-slate-100" aria-label="Previous month" onclick={on_prev}>
                { icon_chevron_left() }
            </button>
            <h2 class="text-lg font-bold text-slate-800">
                { format!("{} {}", month_name(cursor.month), cursor.year) }
            </h2>
            <button class="p-2 rounded-lg hover:bg-slate-100" aria-label="Next month" onclick={on_next}>
                { icon_chevron_right() }
            </button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct MonthTableProps {
    ctx: PageContext,
}

#[function_component(MonthTable)]
fn month_table(props: &MonthTableProps) -> Html {
    let data = use_state(|| None::<MonthData>);
    let loading = use_state(|| true);
    let error = use_state(|| None::<String>);
    let menu = use_state(|| None::<RowMenu>);
    let hidden_details = use_state(HashSet::<String>::new);
    let deleting = use_state(|| false);

    let settings = use_context::<UseStateHandle<AppSettings>>();
    let currency_symbol = settings
        .as_ref()
        .map(|s| s.currency_symbol.clone())
        .unwrap_or_else(|| "$".to_string());

    // fetch the month view data for the page context
    {
        let data = data.clone();
        let loading = loading.clone();
        let error = error.clone();
        let ctx = props.ctx;
        use_effect_with_deps(
            move |_| {
                spawn_local(async move {
                    let url = format!("/api/my{}/{}", ctx.table.as_str(), ctx.cursor.path_segment());
                    match Request::get(&url)
                        .credentials(RequestCredentials::Include)
                        .send()
                        .await
                    {
                        Ok(resp) if resp.ok() => match resp.json::<MonthData>().await {
                            Ok(month) => data.set(Some(month)),
                            Err(err) => {
                                tracing::warn!("could not decode month data: {:?}", err);
                                error.set(Some("Could not read this month's data.".to_string()));
                            }
                        },
                        Ok(resp) => {
                            error.set(Some(format!("Server returned status {}.", resp.status())));
                        }
                        Err(err) => {
                            tracing::warn!("month data request failed: {:?}", err);
                            error.set(Some("Could not load this month's data.".to_string()));
                        }
                    }
                    loading.set(false);
                });
                || ()
            },
            (),
        );
    }

    let on_delete = {
        let menu = menu.clone();
        let deleting = deleting.clone();
        let table = props.ctx.table;
        Callback::from(move |_| {
            if *deleting {
                return;
            }
            let Some(open) = (*menu).clone() else {
                return;
            };
            deleting.set(true);
            let payload = serde_json::json!({
                "rid": open.row_id,
                "tablename": table.as_str(),
            });
            let menu = menu.clone();
            let deleting = deleting.clone();
            spawn_local(async move {
                post("/deleterow", &payload).await;
                menu.set(None);
                deleting.set(false);
            });
        })
    };

    // show or hide the spending detail rows tagged with the expense id; no network call
    let on_toggle_details = {
        let menu = menu.clone();
        let hidden_details = hidden_details.clone();
        Callback::from(move |_| {
            let Some(open) = (*menu).clone() else {
                return;
            };
            let mut next = (*hidden_details).clone();
            if !next.remove(&open.row_id) {
                next.insert(open.row_id.clone());
            }
            hidden_details.set(next);
            menu.set(None);
        })
    };

    let body = if *loading {
        html! { <p class="p-6 text-sm text-slate-500">{"Loading..."}</p> }
    } else if let Some(message) = &*error {
        html! { <p class="p-6 text-sm text-red-500">{ message.clone() }</p> }
    } else if let Some(month) = &*data {
        if month.rows.is_empty() {
            html! { <p class="p-6 text-sm text-slate-500">{"No records for this month yet."}</p> }
        } else {
            html! {
                <>
                    <div class="overflow-x-auto">
                        <table class="w-full text-left border-collapse">
                            <thead>
                                <tr class="bg-slate-50 text-slate-500 text-[10px] uppercase tracking-widest">
                                    { for month.columns.iter().map(|column| html! {
                                        <th class="px-8 py-4 font-bold">{ column }</th>
                                    }) }
                                </tr>
                            </thead>
                            <tbody class="divide-y divide-slate-100">
                                { for month.rows.iter().map(|row| {
                                    let on_menu = {
                                        let menu = menu.clone();
                                        let row_id = row.id.clone();
                                        Callback::from(move |e: MouseEvent| {
                                            e.prevent_default();
                                            // a new right click replaces any open panel
                                            menu.set(Some(RowMenu {
                                                x: e.client_x(),
                                                y: e.client_y(),
                                                row_id: row_id.clone(),
                                            }));
                                        })
                                    };
                                    let show_details = !row.details.is_empty()
                                        && !hidden_details.contains(&row.id);
                                    html! {
                                        <>
                                            <tr key={row.id.clone()} class="text-sm hover:bg-slate-50 transition-colors"
                                                oncontextmenu={on_menu}>
                                                { for row.cells.iter().map(|cell| html! {
                                                    <td class="px-8 py-4 text-slate-700">{ cell }</td>
                                                }) }
                                            </tr>
                                            { if show_details {
                                                html! {
                                                    <>
                                                        { for row.details.iter().map(|detail| html! {
                                                            <tr key={format!("{}-{}", row.id, detail.id)}
                                                                class={format!("detail-{} bg-slate-50 text-xs text-slate-500", row.id)}>
                                                                { for detail.cells.iter().map(|cell| html! {
                                                                    <td class="px-8 py-2">{ cell }</td>
                                                                }) }
                                                            </tr>
                                                        }) }
                                                    </>
                                                }
                                            } else {
                                                html! {}
                                            } }
                                        </>
                                    }
                                }) }
                            </tbody>
                        </table>
                    </div>
                    <div class="p-6 flex items-center justify-between border-t border-slate-200 text-sm">
                        <span class="font-bold text-slate-800">
                            { format!("Total: {}", format_amount(month.total, &currency_symbol)) }
                        </span>
                        { if let Some(spent) = month.spent_total {
                            html! {
                                <span class="text-slate-500">
                                    { format!("Spent: {}", format_amount(spent, &currency_symbol)) }
                                </span>
                            }
                        } else {
                            html! {}
                        } }
                    </div>
                </>
            }
        }
    } else {
        html! {}
    };

    html! {
        <div class="bg-white rounded-xl border border-slate-200 overflow-hidden">
            { body }
            { if let Some(open) = &*menu {
                let on_leave = {
                    let menu = menu.clone();
                    Callback::from(move |_| menu.set(None))
                };
                html! {
                    <div class="fixed z-50 bg-white border border-slate-200 rounded-lg shadow-lg py-1 w-44"
                        style={format!("left: {}px; top: {}px;", open.x, open.y)}
                        onmouseleave={on_leave}>
                        <button type="button"
                            class="w-full text-left px-4 py-2 text-sm text-red-600 hover:bg-slate-50 disabled:opacity-50"
                            onclick={on_delete} disabled={*deleting}>
                            { if *deleting { "Deleting..." } else { "Delete" } }
                        </button>
                        { if props.ctx.table == TableName::Expenses {
                            html! {
                                <button type="button"
                                    class="w-full text-left px-4 py-2 text-sm text-slate-700 hover:bg-slate-50"
                                    onclick={on_toggle_details}>
                                    {"Show / Hide Spending"}
                                </button>
                            }
                        } else {
                            html! {}
                        } }
                    </div>
                }
            } else {
                html! {}
            } }
        </div>
    }
}

#[function_component(App)]
fn app() -> Html {
    let settings = use_state(load_settings);
    let ctx = page_context_from_location();

    html! {
        <ContextProvider<UseStateHandle<AppSettings>> context={settings}>
            <div class="min-h-screen bg-slate-100">
                <Header />
                <main class="p-6 max-w-5xl mx-auto space-y-6">
                    <h1 class="text-2xl font-bold text-slate-800">{ ctx.table.title() }</h1>
                    <AddControls />
                    <MonthNav ctx={ctx} />
                    <MonthTable ctx={ctx} />
                </main>
            </div>
        </ContextProvider<UseStateHandle<AppSettings>>>
    }
}

fn icon_base(path: &'static str) -> Html {
    html! {
        <svg width="20" height="20" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round">
            <path d={path}></path>
        </svg>
    }
}

fn icon_wallet() -> Html {
    icon_base("M3 7h18v10H3zM16 7V5H5v2")
}
fn icon_plus() -> Html {
    icon_base("M12 5v14M5 12h14")
}
fn icon_upload() -> Html {
    icon_base("M21 15v4a2 2 0 01-2 2H5a2 2 0 01-2-2v-4M17 8l-5-5-5 5M12 3v12")
}
fn icon_chevron_left() -> Html {
    icon_base("M15 18l-6-6 6-6")
}
fn icon_chevron_right() -> Html {
    icon_base("M9 18l6-6-6-6")
}

fn main() {
    console_error_panic_hook::set_once();
    wasm_tracing::set_as_global_default();

    tracing::info!("starting GastosBro frontend");

    yew::Renderer::<App>::new().render();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_slot_refuses_second_open() {
        let slot = open_overlay(None, FormKind::Spending);
        assert_eq!(slot, Some(FormKind::Spending));

        // a second open of any kind leaves the mounted overlay in place
        let slot = open_overlay(slot, FormKind::Goal);
        assert_eq!(slot, Some(FormKind::Spending));
        let slot = open_overlay(slot, FormKind::Spending);
        assert_eq!(slot, Some(FormKind::Spending));
    }

    #[test]
    fn overlay_slot_reopens_after_close() {
        let slot = open_overlay(None, FormKind::Import);
        assert!(slot.is_some());

        let slot: Option<FormKind> = None;
        assert_eq!(open_overlay(slot, FormKind::Debt), Some(FormKind::Debt));
    }

    #[test]
    fn prev_month_wraps_january() {
        let cursor = DateCursor {
            year: 2024,
            month: 1,
            day: 15,
        };
        assert_eq!(
            cursor.prev_month(),
            DateCursor {
                year: 2023,
                month: 12,
                day: 1
            }
        );
    }

    #[test]
    fn next_month_wraps_december() {
        let cursor = DateCursor {
            year: 2024,
            month: 12,
            day: 20,
        };
        assert_eq!(
            cursor.next_month(),
            DateCursor {
                year: 2025,
                month: 1,
                day: 1
            }
        );
    }

    #[test]
    fn month_moves_pin_the_day_to_first() {
        let cursor = DateCursor {
            year: 2024,
            month: 6,
            day: 17,
        };
        assert_eq!(
            cursor.prev_month(),
            DateCursor {
                year: 2024,
                month: 5,
                day: 1
            }
        );
        assert_eq!(
            cursor.next_month(),
            DateCursor {
                year: 2024,
                month: 7,
                day: 1
            }
        );
    }

    #[test]
    fn date_segment_parsing() {
        assert_eq!(
            DateCursor::parse("2024-1-15"),
            Some(DateCursor {
                year: 2024,
                month: 1,
                day: 15
            })
        );
        assert_eq!(
            DateCursor::parse("2024-3"),
            Some(DateCursor {
                year: 2024,
                month: 3,
                day: 1
            })
        );
        assert_eq!(DateCursor::parse("2024-13-1"), None);
        assert_eq!(DateCursor::parse("2024-0-1"), None);
        assert_eq!(DateCursor::parse("2024-5-32"), None);
        assert_eq!(DateCursor::parse("soon"), None);
        assert_eq!(DateCursor::parse("2024-5-1-extra"), None);
    }

    #[test]
    fn page_context_reads_table_and_date() {
        let fallback = DateCursor {
            year: 2026,
            month: 8,
            day: 5,
        };
        let ctx = parse_page_context("/myexpenses/2024-3-1", fallback);
        assert_eq!(ctx.table, TableName::Expenses);
        assert_eq!(
            ctx.cursor,
            DateCursor {
                year: 2024,
                month: 3,
                day: 1
            }
        );
    }

    #[test]
    fn page_context_without_date_uses_today() {
        let fallback = DateCursor {
            year: 2026,
            month: 8,
            day: 5,
        };
        let ctx = parse_page_context("/myincome", fallback);
        assert_eq!(ctx.table, TableName::Income);
        assert_eq!(ctx.cursor, fallback);
    }

    #[test]
    fn page_context_falls_back_to_spending() {
        let fallback = DateCursor {
            year: 2026,
            month: 8,
            day: 5,
        };
        let ctx = parse_page_context("/", fallback);
        assert_eq!(ctx.table, TableName::Spending);
        assert_eq!(ctx.cursor, fallback);

        let ctx = parse_page_context("/somewhere/2024-2-1", fallback);
        assert_eq!(ctx.table, TableName::Spending);
    }

    #[test]
    fn month_path_is_unpadded() {
        let cursor = DateCursor {
            year: 2024,
            month: 12,
            day: 20,
        };
        assert_eq!(
            month_path(TableName::Expenses, cursor.next_month()),
            "/myexpenses/2025-1-1"
        );
        assert_eq!(month_path(TableName::Goals, cursor), "/mygoals/2024-12-20");
    }

    #[test]
    fn get_requests_append_a_query_string() {
        let parts = request_parts("/x", &serde_json::json!({ "a": 1 }), "GET");
        assert_eq!(parts.url, "/x?a=1");
        assert!(parts.body.is_none());
    }

    #[test]
    fn query_string_joins_pairs() {
        let query = query_string(&serde_json::json!({ "b": 2, "a": "one" }));
        assert_eq!(query, "a=one&b=2");
        assert_eq!(query_string(&serde_json::json!({})), "");
    }

    #[test]
    fn post_requests_carry_a_json_body() {
        let parts = request_parts("/x", &serde_json::json!({ "a": 1 }), "POST");
        assert_eq!(parts.url, "/x");
        assert_eq!(parts.body.as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn delete_row_body_matches_the_backend_contract() {
        let payload = serde_json::json!({
            "rid": "42",
            "tablename": TableName::Expenses.as_str(),
        });
        let parts = request_parts("/deleterow", &payload, "POST");
        assert_eq!(parts.url, "/deleterow");
        assert_eq!(
            parts.body.as_deref(),
            Some(r#"{"rid":"42","tablename":"expenses"}"#)
        );
    }

    #[test]
    fn form_registry_targets_the_backend_endpoints() {
        for kind in FormKind::ALL {
            assert!(kind.endpoint().starts_with('/'));
            assert!(!kind.fields().is_empty());
        }
        assert_eq!(FormKind::Spending.endpoint(), "/addspending");
        assert_eq!(FormKind::Import.endpoint(), "/importcsv");
        assert!(FormKind::Import.multipart());
        assert!(!FormKind::Expense.multipart());
    }

    #[test]
    fn every_add_form_leads_with_a_required_name_field() {
        for kind in FormKind::ALL {
            if kind == FormKind::Import {
                continue;
            }
            let first = &kind.fields()[0];
            assert_eq!(first.name, "name");
            assert!(first.required);
        }
    }

    #[test]
    fn goal_form_carries_the_hidden_zero_amount() {
        let hidden = GOAL_FIELDS
            .iter()
            .find(|field| field.name == "amount")
            .expect("goal amount field");
        assert_eq!(hidden.kind, FieldKind::Hidden("0"));
    }

    #[test]
    fn import_form_lists_every_table() {
        let tables = IMPORT_FIELDS
            .iter()
            .find_map(|field| match field.kind {
                FieldKind::Select(options) => Some(options),
                _ => None,
            })
            .expect("tablename select");
        let values: Vec<&str> = tables.iter().map(|(value, _)| *value).collect();
        assert_eq!(
            values,
            vec!["spending", "expenses", "goals", "debt", "income"]
        );
    }

    #[test]
    fn amounts_format_with_symbol_and_cents() {
        assert_eq!(format_amount(1234.5, "$"), "$1,234.50");
        assert_eq!(format_amount(-7.0, "₱"), "-₱7.00");
        assert_eq!(format_amount(0.0, "€"), "€0.00");
    }
}
