//! In-memory stand-in for the backend, used by tests. Clones share state so a
//! test can keep a handle while a client or session owns another.

use serde_json::{json, Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{ApiRequest, Method, Transport};
use crate::error::ApiError;
use crate::models::{Interview, Placement, PlacementUpdate, Role, SelectionRecord, User};

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct State {
    accounts: Vec<Account>,
    tokens: HashMap<String, String>,
    placements: Vec<Placement>,
    interviews: Vec<Interview>,
    selections: Vec<SelectionRecord>,
    canned: HashMap<(Method, String), Result<Value, (u16, String)>>,
    requests: Vec<ApiRequest>,
    next_id: u64,
}

impl State {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }

    fn issue_token(&mut self, user_id: &str) -> String {
        let token = self.id("tok-");
        self.tokens.insert(token.clone(), user_id.to_string());
        token
    }
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Rc<RefCell<State>>,
}

fn fail(status: u16, message: &str) -> ApiError {
    ApiError::Status { status, message: Some(message.to_string()) }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn body_with_id(body: Option<&Value>, id: &str, extra: &[(&str, &str)]) -> Value {
    let mut map = body.and_then(Value::as_object).cloned().unwrap_or_else(Map::new);
    map.insert("_id".into(), json!(id));
    for (k, v) in extra {
        map.insert((*k).into(), json!(v));
    }
    Value::Object(map)
}

fn parse<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| fail(400, &e.to_string()))
}

fn field<'a>(body: Option<&'a Value>, key: &str) -> Option<&'a str> {
    body?.get(key)?.as_str()
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account and return a valid token for it.
    pub fn add_user(&self, email: &str, password: &str, name: &str, role: Role) -> String {
        let mut state = self.state.borrow_mut();
        let id = state.id("u");
        state.accounts.push(Account {
            user: User {
                id: id.clone(),
                name: name.to_string(),
                email: email.to_string(),
                rollno: String::new(),
                role,
            },
            password: password.to_string(),
        });
        state.issue_token(&id)
    }

    /// Invalidate every issued token, as if they all expired.
    pub fn expire_tokens(&self) {
        self.state.borrow_mut().tokens.clear();
    }

    /// Answer `method path` with `body` instead of the simulated behaviour.
    pub fn respond_with(&self, method: Method, path: &str, body: Value) {
        self.state
            .borrow_mut()
            .canned
            .insert((method, path.to_string()), Ok(body));
    }

    /// Answer `method path` with an error status and message.
    pub fn fail_with(&self, method: Method, path: &str, status: u16, message: &str) {
        self.state
            .borrow_mut()
            .canned
            .insert((method, path.to_string()), Err((status, message.to_string())));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.borrow().requests.clone()
    }

    fn route(&self, req: &ApiRequest) -> Result<Value, ApiError> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let body = req.body.as_ref();
        let segs: Vec<&str> = req.path.trim_matches('/').split('/').collect();

        match (req.method, segs.as_slice()) {
            (Method::Post, ["auth", "register"]) => {
                let email = field(body, "email").unwrap_or_default().to_string();
                if state.accounts.iter().any(|a| a.user.email == email) {
                    return Err(fail(400, "User already exists"));
                }
                let id = state.id("u");
                let user: User = parse(body_with_id(body, &id, &[]))?;
                state.accounts.push(Account {
                    user: user.clone(),
                    password: field(body, "password").unwrap_or_default().to_string(),
                });
                let token = state.issue_token(&id);
                return Ok(json!({ "token": token, "user": user }));
            }
            (Method::Post, ["auth", "login"]) => {
                let email = field(body, "email").unwrap_or_default();
                let password = field(body, "password").unwrap_or_default();
                let user = state
                    .accounts
                    .iter()
                    .find(|a| a.user.email == email && a.password == password)
                    .map(|a| a.user.clone())
                    .ok_or_else(|| fail(401, "Invalid credentials"))?;
                let token = state.issue_token(&user.id);
                return Ok(json!({ "token": token, "user": user }));
            }
            _ => {}
        }

        let user_id = req
            .bearer
            .as_ref()
            .and_then(|t| state.tokens.get(t))
            .cloned()
            .ok_or_else(|| fail(401, "Not authorized, token failed"))?;

        match (req.method, segs.as_slice()) {
            (Method::Get, ["auth", "me"]) => {
                let account = state
                    .accounts
                    .iter()
                    .find(|a| a.user.id == user_id)
                    .ok_or_else(|| fail(404, "User not found"))?;
                Ok(json!(account.user))
            }
            (Method::Put, ["auth", "me"]) => {
                let account = state
                    .accounts
                    .iter_mut()
                    .find(|a| a.user.id == user_id)
                    .ok_or_else(|| fail(404, "User not found"))?;
                if let Some(new_password) = field(body, "newPassword") {
                    if field(body, "password") != Some(account.password.as_str()) {
                        return Err(fail(400, "Current password is incorrect"));
                    }
                    account.password = new_password.to_string();
                }
                if let Some(name) = field(body, "name") {
                    account.user.name = name.to_string();
                }
                if let Some(email) = field(body, "email") {
                    account.user.email = email.to_string();
                }
                Ok(json!({ "message": "Profile updated", "user": account.user }))
            }

            (Method::Get, ["placements"]) => Ok(json!({ "placements": state.placements })),
            (Method::Post, ["placements"]) => {
                let id = state.id("p");
                let created = now();
                let placement: Placement =
                    parse(body_with_id(body, &id, &[("createdAt", created.as_str())]))?;
                state.placements.push(placement.clone());
                Ok(json!({ "message": "Placement created", "placement": placement }))
            }
            (Method::Get, ["placements", id]) => {
                let placement = state
                    .placements
                    .iter()
                    .find(|p| p.id == *id)
                    .ok_or_else(|| fail(404, "Placement not found"))?;
                Ok(json!({ "placement": placement }))
            }
            (Method::Put, ["placements", id]) => {
                let mut placement: Placement = parse(body_with_id(body, id, &[]))?;
                let existing = state
                    .placements
                    .iter_mut()
                    .find(|p| p.id == *id)
                    .ok_or_else(|| fail(404, "Placement not found"))?;
                placement.updates = std::mem::take(&mut existing.updates);
                placement.created_at = existing.created_at.take();
                *existing = placement.clone();
                Ok(json!({ "message": "Placement updated", "placement": placement }))
            }
            (Method::Delete, ["placements", id]) => {
                let before = state.placements.len();
                state.placements.retain(|p| p.id != *id);
                if state.placements.len() == before {
                    return Err(fail(404, "Placement not found"));
                }
                Ok(json!({ "message": "Placement deleted" }))
            }

            (Method::Post, ["placements", id, "updates"]) => {
                let update_id = state.id("upd");
                let created = now();
                let update: PlacementUpdate =
                    parse(body_with_id(body, &update_id, &[("createdAt", created.as_str())]))?;
                let placement = state
                    .placements
                    .iter_mut()
                    .find(|p| p.id == *id)
                    .ok_or_else(|| fail(404, "Placement not found"))?;
                placement.updates.push(update);
                Ok(json!({ "message": "Update added", "placement": placement }))
            }
            (Method::Put, ["placements", id, "updates", update_id]) => {
                let placement = state
                    .placements
                    .iter_mut()
                    .find(|p| p.id == *id)
                    .ok_or_else(|| fail(404, "Placement not found"))?;
                let update = placement
                    .updates
                    .iter_mut()
                    .find(|u| u.id == *update_id)
                    .ok_or_else(|| fail(404, "Update not found"))?;
                let edited: PlacementUpdate = parse(body_with_id(body, update_id, &[]))?;
                update.update_type = edited.update_type;
                update.message = edited.message;
                Ok(json!({ "message": "Update edited", "placement": placement }))
            }
            (Method::Delete, ["placements", id, "updates", update_id]) => {
                let placement = state
                    .placements
                    .iter_mut()
                    .find(|p| p.id == *id)
                    .ok_or_else(|| fail(404, "Placement not found"))?;
                placement.updates.retain(|u| u.id != *update_id);
                Ok(json!({ "message": "Update deleted", "placement": placement }))
            }

            (Method::Get, ["interviews", placement_id]) => {
                let list: Vec<&Interview> = state
                    .interviews
                    .iter()
                    .filter(|i| i.placement_id == *placement_id)
                    .collect();
                Ok(json!({ "interviews": list }))
            }
            (Method::Post, ["interviews", placement_id]) => {
                let id = state.id("iv");
                let interview: Interview =
                    parse(body_with_id(body, &id, &[("placementId", *placement_id)]))?;
                state.interviews.push(interview.clone());
                Ok(json!({ "message": "Interview added", "interview": interview }))
            }
            (Method::Put, ["interviews", id]) => {
                let existing = state
                    .interviews
                    .iter_mut()
                    .find(|i| i.id == *id)
                    .ok_or_else(|| fail(404, "Interview not found"))?;
                let placement_id = existing.placement_id.clone();
                *existing = parse(body_with_id(body, id, &[("placementId", placement_id.as_str())]))?;
                Ok(json!({ "message": "Interview updated", "updated": existing }))
            }
            (Method::Delete, ["interviews", id]) => {
                state.interviews.retain(|i| i.id != *id);
                Ok(json!({ "message": "Interview deleted" }))
            }

            (Method::Get, ["selections", placement_id]) => {
                let list: Vec<&SelectionRecord> = state
                    .selections
                    .iter()
                    .filter(|s| s.placement_id == *placement_id)
                    .collect();
                Ok(json!({ "selections": list }))
            }
            (Method::Post, ["selections", placement_id]) => {
                let id = state.id("sel");
                let record: SelectionRecord =
                    parse(body_with_id(body, &id, &[("placementId", *placement_id)]))?;
                state.selections.push(record.clone());
                Ok(json!({ "message": "Selection added", "selection": record }))
            }
            (Method::Put, ["selections", id]) => {
                let existing = state
                    .selections
                    .iter_mut()
                    .find(|s| s.id == *id)
                    .ok_or_else(|| fail(404, "Selection not found"))?;
                let placement_id = existing.placement_id.clone();
                *existing = parse(body_with_id(body, id, &[("placementId", placement_id.as_str())]))?;
                Ok(json!({ "message": "Selection updated", "updated": existing }))
            }
            (Method::Delete, ["selections", id]) => {
                state.selections.retain(|s| s.id != *id);
                Ok(json!({ "message": "Selection deleted" }))
            }

            _ => Err(fail(404, "Route not found")),
        }
    }
}

impl Transport for FakeBackend {
    fn send(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let canned = {
            let mut state = self.state.borrow_mut();
            state.requests.push(request.clone());
            state.canned.get(&(request.method, request.path.clone())).cloned()
        };
        match canned {
            Some(Ok(body)) => Ok(body),
            Some(Err((status, message))) => Err(fail(status, &message)),
            None => self.route(request),
        }
    }
}
