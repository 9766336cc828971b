use om_auth::password::hash_password;
use om_core::entities::User;
use om_db::OmService;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{UserAddArgs, UserCommands};
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct SetAdminResponse<'a> {
    user_id: &'a str,
    is_admin: bool,
}

/// Handle `omap user`.
pub async fn handle(action: &UserCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        UserCommands::Add(args) => {
            let user = add_user(&ctx.service, args).await?;
            output(&user, flags.format)
        }
        UserCommands::SetAdmin { user_id, revoke } => {
            let is_admin = !revoke;
            ctx.service.set_user_admin(user_id, is_admin).await?;
            output(&SetAdminResponse { user_id, is_admin }, flags.format)
        }
    }
}

async fn add_user(service: &OmService, args: &UserAddArgs) -> anyhow::Result<User> {
    if args.password.is_empty() {
        anyhow::bail!("password must not be empty");
    }
    let password_hash = hash_password(&args.password)?;
    let user = service
        .create_user(
            &args.organization,
            &args.email,
            &args.full_name,
            &password_hash,
            args.admin,
        )
        .await?;
    tracing::info!(user_id = %user.user_id, organization = %user.organization_id, "user created");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use om_auth::password::verify_password;
    use om_db::{OmDb, OmService};
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(email: &str, password: &str) -> UserAddArgs {
        UserAddArgs {
            email: email.into(),
            password: password.into(),
            organization: "org-1".into(),
            full_name: "Ada".into(),
            admin: true,
        }
    }

    async fn service() -> OmService {
        OmService::from_db(OmDb::open_local(":memory:").await.unwrap())
    }

    #[tokio::test]
    async fn add_user_stores_a_verifiable_hash() {
        let svc = service().await;
        let user = add_user(&svc, &args("Ada@Example.org", "hunter2")).await.unwrap();
        assert!(user.is_admin);
        assert_eq!(user.organization_id, "org-1");

        let credentials = svc
            .find_credentials_by_email("ada@example.org")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credentials.user_id, user.user_id);
        assert_ne!(credentials.password_hash, "hunter2");
        assert!(verify_password("hunter2", &credentials.password_hash));
    }

    #[tokio::test]
    async fn empty_password_is_rejected() {
        let svc = service().await;
        let err = add_user(&svc, &args("ada@example.org", "")).await.unwrap_err();
        assert!(err.to_string().contains("password must not be empty"));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let svc = service().await;
        add_user(&svc, &args("ada@example.org", "a")).await.unwrap();
        assert!(add_user(&svc, &args("ADA@example.org", "b")).await.is_err());
    }
}
