//! API route handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use rand::Rng;
use serde::Deserialize;
use serde_json::{Value, json};

use ejare_store::{Contract, NewContract, NotificationSettings};

use crate::auth::{AdminClaims, AuthClaims};
use crate::error::ApiError;
use crate::messages;
use crate::server::AppState;

/// Health check endpoint (ungated).
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

// ── Login ────────────────────────────────────

/// Either admin credentials or a tenant contract-number/access-code pair.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub contract_number: Option<String>,
    #[serde(default)]
    pub access_code: Option<String>,
}

/// Two mutually exclusive branches selected by request shape. Every failure
/// collapses into the same generic 401 so the response never reveals which
/// part of the credentials was wrong.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    if let (Some(username), Some(password)) = (req.username.as_deref(), req.password.as_deref()) {
        if username == "admin" {
            let user = state.store.lock().unwrap().get_admin_by_username(username)?;
            if let Some(user) = user {
                if ejare_auth::verify_password(password, &user.password_hash) {
                    let token = state.tokens.issue_admin(&user.id)?;
                    return Ok(Json(json!({
                        "success": true,
                        "token": token,
                        "user": {"id": user.id, "username": user.username, "role": user.role},
                    })));
                }
            }
        }
    }

    if let (Some(number), Some(code)) = (req.contract_number.as_deref(), req.access_code.as_deref())
    {
        let contract = state.store.lock().unwrap().find_tenant_credentials(number, code)?;
        if let Some(contract) = contract {
            let token = state.tokens.issue_tenant(&contract.id)?;
            return Ok(Json(json!({
                "success": true,
                "token": token,
                "contract": {"id": contract.id, "contractNumber": contract.contract_number},
            })));
        }
    }

    Err(ApiError::LoginFailed)
}

// ── Contracts ────────────────────────────────────

/// Admins see every contract newest-first; tenants see only the contract
/// their token is scoped to, as a one-element list.
pub async fn list_contracts(
    State(state): State<Arc<AppState>>,
    AuthClaims(claims): AuthClaims,
) -> Result<Json<Vec<Contract>>, ApiError> {
    let store = state.store.lock().unwrap();
    if claims.is_admin() {
        Ok(Json(store.list_contracts()?))
    } else if claims.is_tenant() {
        let id = claims.contract_id.as_deref().ok_or(ApiError::Forbidden)?;
        Ok(Json(store.get_contract(id)?.into_iter().collect()))
    } else {
        Err(ApiError::Forbidden)
    }
}

fn new_contract_number() -> String {
    format!(
        "RC-{}{:03}",
        Utc::now().timestamp_millis(),
        rand::thread_rng().gen_range(0..1000)
    )
}

fn new_access_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999u32).to_string()
}

pub async fn create_contract(
    State(state): State<Arc<AppState>>,
    AdminClaims(_claims): AdminClaims,
    Json(req): Json<NewContract>,
) -> Result<Json<Value>, ApiError> {
    let id = uuid::Uuid::new_v4().to_string();
    let contract_number = new_contract_number();
    let access_code = new_access_code();

    let settings = {
        let store = state.store.lock().unwrap();
        store.insert_contract(&id, &contract_number, &access_code, &req)?;
        store.get_settings()?.unwrap_or_default()
    };

    // Best-effort access-code delivery; contract creation already committed.
    let body = format!(
        "شماره قرارداد: {contract_number}<br>کد دسترسی: {access_code}"
    );
    state
        .dispatcher
        .best_effort_email(
            settings.email_from.as_deref(),
            &req.tenant_email,
            messages::ACCESS_CODE_SUBJECT,
            &body,
        )
        .await;

    Ok(Json(json!({
        "success": true,
        "contractNumber": contract_number,
        "accessCode": access_code,
        "id": id,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    pub signature: String,
    #[serde(default)]
    pub national_id_image: Option<String>,
}

/// Tenant-only. The token must be scoped to the contract being signed, and
/// the contract must exist; both checks reject before any write happens.
pub async fn sign_contract(
    State(state): State<Arc<AppState>>,
    AuthClaims(claims): AuthClaims,
    Path(contract_number): Path<String>,
    Json(req): Json<SignRequest>,
) -> Result<Json<Value>, ApiError> {
    if !claims.is_tenant() {
        return Err(ApiError::Forbidden);
    }

    let (contract, settings) = {
        let store = state.store.lock().unwrap();
        let contract = store
            .get_contract_by_number(&contract_number)?
            .ok_or(ApiError::NotFound(messages::CONTRACT_NOT_FOUND))?;
        if claims.contract_id.as_deref() != Some(contract.id.as_str()) {
            return Err(ApiError::Forbidden);
        }
        store.sign_contract(&contract_number, &req.signature, req.national_id_image.as_deref())?;
        (contract, store.get_settings()?.unwrap_or_default())
    };

    // Best-effort landlord notifications; the signature is already committed.
    let body = format!(
        "قرارداد {contract_number} توسط {} امضا شد",
        contract.tenant_name
    );
    state
        .dispatcher
        .best_effort_email(
            settings.email_from.as_deref(),
            &contract.landlord_email,
            messages::SIGNED_SUBJECT,
            &body,
        )
        .await;
    if settings.telegram_enabled {
        state
            .dispatcher
            .best_effort_telegram(settings.telegram_chat_id.as_deref(), &body)
            .await;
    }

    Ok(Json(json!({"success": true, "message": messages::CONTRACT_SIGNED})))
}

/// Admin-only administrative termination.
pub async fn terminate_contract(
    State(state): State<Arc<AppState>>,
    AdminClaims(_claims): AdminClaims,
    Path(contract_number): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let affected = state.store.lock().unwrap().terminate_contract(&contract_number)?;
    if affected == 0 {
        return Err(ApiError::NotFound(messages::CONTRACT_NOT_FOUND));
    }
    Ok(Json(json!({"success": true, "message": messages::CONTRACT_TERMINATED})))
}

// ── Charts ────────────────────────────────────

/// Monthly income over signed contracts, at most 12 entries, newest first.
pub async fn income_chart(
    State(state): State<Arc<AppState>>,
    AdminClaims(_claims): AdminClaims,
) -> Result<Json<Vec<Value>>, ApiError> {
    let rows = state.store.lock().unwrap().income_by_month()?;
    let out = rows
        .into_iter()
        .map(|r| {
            json!({
                "month": messages::month_label(&r.month),
                "income": r.income,
                "contracts": r.contracts,
            })
        })
        .collect();
    Ok(Json(out))
}

/// Contract counts per status with display labels.
pub async fn status_chart(
    State(state): State<Arc<AppState>>,
    AdminClaims(_claims): AdminClaims,
) -> Result<Json<Vec<Value>>, ApiError> {
    let rows = state.store.lock().unwrap().status_counts()?;
    let out = rows
        .into_iter()
        .map(|r| {
            json!({
                "status": messages::status_label(&r.status),
                "count": r.count,
            })
        })
        .collect();
    Ok(Json(out))
}

// ── Notification settings ────────────────────────────────────

pub async fn get_notification_settings(
    State(state): State<Arc<AppState>>,
    AdminClaims(_claims): AdminClaims,
) -> Result<Json<NotificationSettings>, ApiError> {
    let settings = state.store.lock().unwrap().get_settings()?.unwrap_or_default();
    Ok(Json(settings))
}

pub async fn update_notification_settings(
    State(state): State<Arc<AppState>>,
    AdminClaims(_claims): AdminClaims,
    Json(req): Json<NotificationSettings>,
) -> Result<Json<Value>, ApiError> {
    state.store.lock().unwrap().upsert_settings(&req)?;
    Ok(Json(json!({"success": true, "message": messages::SETTINGS_SAVED})))
}

// ── Notification test ────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TestNotificationRequest {
    /// Channel name; the settings UI posts either key.
    #[serde(rename = "type", alias = "service", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub recipient: Option<String>,
}

/// Interactive configuration check. Unlike the workflow sends, failures here
/// surface to the caller.
pub async fn test_notification(
    State(state): State<Arc<AppState>>,
    AdminClaims(_claims): AdminClaims,
    Json(req): Json<TestNotificationRequest>,
) -> Result<Json<Value>, ApiError> {
    let settings = state.store.lock().unwrap().get_settings()?.unwrap_or_default();

    match req.kind.as_deref().unwrap_or_default() {
        "email" => {
            let to = req
                .recipient
                .as_deref()
                .or(settings.email_from.as_deref())
                .ok_or(ApiError::BadRequest(messages::MISSING_RECIPIENT))?;
            state
                .dispatcher
                .send_email(
                    settings.email_from.as_deref(),
                    to,
                    messages::TEST_SUBJECT,
                    messages::TEST_BODY,
                )
                .await?;
        }
        "telegram" => {
            state
                .dispatcher
                .send_telegram(
                    req.recipient.as_deref().or(settings.telegram_chat_id.as_deref()),
                    messages::TEST_BODY,
                )
                .await?;
        }
        "whatsapp" => {
            state
                .dispatcher
                .send_whatsapp(
                    req.recipient.as_deref().or(settings.whatsapp_number.as_deref()),
                    messages::TEST_BODY,
                )
                .await?;
        }
        _ => return Err(ApiError::BadRequest(messages::UNKNOWN_CHANNEL)),
    }

    Ok(Json(json!({"success": true, "message": messages::TEST_SENT})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::AppState;
    use ejare_auth::{Claims, ROLE_ADMIN, ROLE_TENANT, TokenService};
    use ejare_notify::Dispatcher;
    use ejare_store::ContractStore;
    use std::path::PathBuf;
    use std::sync::Mutex;

    fn test_state() -> Arc<AppState> {
        let store = ContractStore::open(&PathBuf::from(":memory:")).unwrap();
        Arc::new(AppState {
            store: Mutex::new(store),
            tokens: TokenService::new("test-secret-key").unwrap(),
            dispatcher: Dispatcher::disabled(),
        })
    }

    fn admin() -> AdminClaims {
        AdminClaims(Claims {
            role: ROLE_ADMIN.into(),
            user_id: Some("admin-1".into()),
            contract_id: None,
            iat: 0,
            exp: 0,
        })
    }

    fn tenant(contract_id: &str) -> AuthClaims {
        AuthClaims(Claims {
            role: ROLE_TENANT.into(),
            user_id: None,
            contract_id: Some(contract_id.into()),
            iat: 0,
            exp: 0,
        })
    }

    fn new_contract(tenant_email: &str, rent: &str) -> NewContract {
        NewContract {
            tenant_name: "Ali Rezaei".into(),
            tenant_email: tenant_email.into(),
            tenant_phone: None,
            tenant_national_id: None,
            landlord_name: "Hamid Karimi".into(),
            landlord_email: "landlord@example.com".into(),
            landlord_national_id: None,
            property_address: "Tehran, Enghelab Ave.".into(),
            property_type: None,
            property_size: None,
            property_features: None,
            rent_amount: rent.into(),
            deposit: None,
            start_date: "2026-01-01".into(),
            end_date: "2027-01-01".into(),
            notes: None,
            policies: None,
        }
    }

    async fn create(state: &Arc<AppState>, email: &str, rent: &str) -> Value {
        create_contract(
            State(state.clone()),
            admin(),
            Json(new_contract(email, rent)),
        )
        .await
        .unwrap()
        .0
    }

    #[tokio::test]
    async fn test_health() {
        let json = health().await.0;
        assert_eq!(json["status"], "OK");
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_admin_login_roundtrip() {
        let state = test_state();
        let hash = ejare_auth::hash_password("s3cret").unwrap();
        state.store.lock().unwrap().create_user("admin", &hash).unwrap();

        let resp = login(
            State(state.clone()),
            Json(LoginRequest {
                username: Some("admin".into()),
                password: Some("s3cret".into()),
                contract_number: None,
                access_code: None,
            }),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(resp["success"], true);
        assert_eq!(resp["user"]["role"], "admin");

        let claims = state.tokens.verify(resp["token"].as_str().unwrap()).unwrap();
        assert!(claims.is_admin());
        assert!(claims.user_id.is_some());
    }

    #[tokio::test]
    async fn test_login_failures_are_identical() {
        let state = test_state();
        let hash = ejare_auth::hash_password("s3cret").unwrap();
        state.store.lock().unwrap().create_user("admin", &hash).unwrap();

        // wrong password and unknown user map to the same rejection
        for (user, pass) in [("admin", "wrong"), ("nobody", "s3cret"), ("admin", "wrong")] {
            let err = login(
                State(state.clone()),
                Json(LoginRequest {
                    username: Some(user.into()),
                    password: Some(pass.into()),
                    contract_number: None,
                    access_code: None,
                }),
            )
            .await
            .unwrap_err();
            assert!(matches!(err, ApiError::LoginFailed));
        }
    }

    #[tokio::test]
    async fn test_create_contract_shape() {
        let state = test_state();
        let resp = create(&state, "t@example.com", "10000000").await;

        assert_eq!(resp["success"], true);
        let number = resp["contractNumber"].as_str().unwrap();
        let code = resp["accessCode"].as_str().unwrap();
        assert!(number.starts_with("RC-"));
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        // immediately retrievable via admin list, in draft
        let list = list_contracts(State(state.clone()), AuthClaims(admin().0))
            .await
            .unwrap()
            .0;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].status, "draft");
    }

    #[tokio::test]
    async fn test_tenant_login_with_created_credentials() {
        let state = test_state();
        let resp = create(&state, "t@example.com", "10000000").await;

        let ok = login(
            State(state.clone()),
            Json(LoginRequest {
                username: None,
                password: None,
                contract_number: Some(resp["contractNumber"].as_str().unwrap().into()),
                access_code: Some(resp["accessCode"].as_str().unwrap().into()),
            }),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(ok["success"], true);
        let claims = state.tokens.verify(ok["token"].as_str().unwrap()).unwrap();
        assert!(claims.is_tenant());
        assert_eq!(
            claims.contract_id.as_deref(),
            Some(resp["id"].as_str().unwrap())
        );

        // wrong access code falls into the shared failure path
        let err = login(
            State(state.clone()),
            Json(LoginRequest {
                username: None,
                password: None,
                contract_number: Some(resp["contractNumber"].as_str().unwrap().into()),
                access_code: Some("000000".into()),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::LoginFailed));
    }

    #[tokio::test]
    async fn test_tenant_list_sees_only_own_contract() {
        let state = test_state();
        let first = create(&state, "a@example.com", "1000").await;
        create(&state, "b@example.com", "2000").await;

        let id = first["id"].as_str().unwrap();
        let list = list_contracts(State(state.clone()), tenant(id)).await.unwrap().0;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, id);

        let all = list_contracts(State(state.clone()), AuthClaims(admin().0))
            .await
            .unwrap()
            .0;
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_role_is_forbidden() {
        let state = test_state();
        let err = list_contracts(
            State(state),
            AuthClaims(Claims {
                role: "superuser".into(),
                user_id: None,
                contract_id: None,
                iat: 0,
                exp: 0,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[tokio::test]
    async fn test_sign_contract_flow() {
        let state = test_state();
        let resp = create(&state, "t@example.com", "1000").await;
        let number = resp["contractNumber"].as_str().unwrap();
        let id = resp["id"].as_str().unwrap();

        let ok = sign_contract(
            State(state.clone()),
            tenant(id),
            Path(number.to_string()),
            Json(SignRequest {
                signature: "sig-blob".into(),
                national_id_image: Some("img-blob".into()),
            }),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(ok["success"], true);

        let signed = state
            .store
            .lock()
            .unwrap()
            .get_contract_by_number(number)
            .unwrap()
            .unwrap();
        assert_eq!(signed.status, "signed");
        assert!(signed.signed_at.is_some());
    }

    #[tokio::test]
    async fn test_sign_unknown_contract_is_not_found() {
        let state = test_state();
        let err = sign_contract(
            State(state),
            tenant("some-id"),
            Path("RC-0000".into()),
            Json(SignRequest {
                signature: "sig".into(),
                national_id_image: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_sign_requires_matching_contract_token() {
        let state = test_state();
        let own = create(&state, "a@example.com", "1000").await;
        let other = create(&state, "b@example.com", "2000").await;

        // a valid tenant token for a different contract must not sign this one
        let err = sign_contract(
            State(state.clone()),
            tenant(other["id"].as_str().unwrap()),
            Path(own["contractNumber"].as_str().unwrap().to_string()),
            Json(SignRequest {
                signature: "sig".into(),
                national_id_image: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));

        // nor can an admin-role token
        let err = sign_contract(
            State(state),
            AuthClaims(admin().0),
            Path(own["contractNumber"].as_str().unwrap().to_string()),
            Json(SignRequest {
                signature: "sig".into(),
                national_id_image: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[tokio::test]
    async fn test_terminate_blocks_tenant_login() {
        let state = test_state();
        let resp = create(&state, "t@example.com", "1000").await;
        let number = resp["contractNumber"].as_str().unwrap();

        terminate_contract(State(state.clone()), admin(), Path(number.to_string()))
            .await
            .unwrap();

        let err = login(
            State(state),
            Json(LoginRequest {
                username: None,
                password: None,
                contract_number: Some(number.into()),
                access_code: Some(resp["accessCode"].as_str().unwrap().into()),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::LoginFailed));
    }

    #[tokio::test]
    async fn test_income_chart_labels() {
        let state = test_state();
        let resp = create(&state, "t@example.com", "10000000").await;
        let number = resp["contractNumber"].as_str().unwrap();
        state
            .store
            .lock()
            .unwrap()
            .sign_contract(number, "sig", None)
            .unwrap();

        let rows = income_chart(State(state), admin()).await.unwrap().0;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["income"], 10_000_000.0);
        assert_eq!(rows[0]["contracts"], 1);
        // month label is a Persian month name plus the year, not a raw key
        assert!(!rows[0]["month"].as_str().unwrap().contains('-'));
    }

    #[tokio::test]
    async fn test_status_chart_labels() {
        let state = test_state();
        create(&state, "t@example.com", "1000").await;

        let rows = status_chart(State(state), admin()).await.unwrap().0;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["status"], "پیش‌نویس");
        assert_eq!(rows[0]["count"], 1);
    }

    #[tokio::test]
    async fn test_settings_default_and_update() {
        let state = test_state();

        let defaults = get_notification_settings(State(state.clone()), admin())
            .await
            .unwrap()
            .0;
        assert!(!defaults.email_enabled);
        assert!(!defaults.telegram_enabled);
        assert!(!defaults.whatsapp_enabled);

        update_notification_settings(
            State(state.clone()),
            admin(),
            Json(NotificationSettings {
                telegram_enabled: true,
                telegram_chat_id: Some("-100500".into()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        let saved = get_notification_settings(State(state), admin()).await.unwrap().0;
        assert!(saved.telegram_enabled);
        assert_eq!(saved.telegram_chat_id.as_deref(), Some("-100500"));
    }

    #[tokio::test]
    async fn test_notification_test_surfaces_failures() {
        let state = test_state();

        // unconfigured channel propagates as a send failure
        let err = test_notification(
            State(state.clone()),
            admin(),
            Json(TestNotificationRequest {
                kind: Some("telegram".into()),
                recipient: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::SendFailed));

        // unknown channel is a bad request
        let err = test_notification(
            State(state),
            admin(),
            Json(TestNotificationRequest {
                kind: Some("fax".into()),
                recipient: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_email_test_requires_recipient() {
        let state = test_state();
        let err = test_notification(
            State(state),
            admin(),
            Json(TestNotificationRequest {
                kind: Some("email".into()),
                recipient: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
