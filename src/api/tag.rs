use crate::{front, metric, models, repo};

/// Links the tag with `code` to `pet_id`. Only a tag without pet is updated,
/// so an unknown code and a tag already in use end the same way.
#[tracing::instrument(skip(repo))]
pub async fn link_tag_to_pet(
    code: &str,
    pet_id: i64,
    source: models::tag::TagSource,
    repo: &repo::ImplPetRepo,
) -> anyhow::Result<models::tag::Tag> {
    let code = front::forms::tag::validate_tag_code(code)?;

    let linked = repo.link_unlinked_tag(&code, pet_id).await?;

    let Some(tag) = linked.into_iter().next() else {
        return Err(front::errors::UserError::TagUnavailable.into());
    };

    metric::incr_user_action_statds(&format!("link_tag_{}", source.to_string().to_lowercase()));
    Ok(tag)
}

/// Public card of a lost pet for whoever found its tag. Works without session.
#[tracing::instrument(skip(repo))]
pub async fn lookup_public_pet(
    code: &str,
    repo: &repo::ImplPetRepo,
) -> anyhow::Result<models::tag::PublicPet> {
    let code = code.trim();
    if code.is_empty() {
        return Err(front::errors::UserError::EmptyTagCode.into());
    }

    let found = repo.get_public_pet_by_tag(code).await?;

    match found.into_iter().next() {
        Some(pet) => {
            metric::incr_finder_action_statds("found");
            Ok(pet)
        }
        None => {
            metric::incr_finder_action_statds("not_found");
            Err(front::errors::UserError::PublicPetNotFound.into())
        }
    }
}
