use async_trait::async_trait;
use reqwest::{
    cookie::{CookieStore, Jar},
    Client, RequestBuilder, Response, StatusCode, Url,
};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::dto::{
    ChaptersResponse, ErrorBody, MeResponse, NameRequest, RevisionsResponse, ScoreRequest,
    ScoresResponse, SubjectsResponse, SummaryResponse,
};
use super::{ApiError, StudyApi};
use crate::domain::{
    Chapter, ChapterDraft, ChapterId, Credentials, Registration, Revision, RevisionId, Score,
    ScoreDraft, ScoreId, ScoreSummary, Subject, SubjectDraft, SubjectId, User, ValidationError,
};

/// Name of the session cookie set by the backend on login.
pub const SESSION_COOKIE: &str = "token";

/// reqwest-backed gateway. Every request goes through one cookie jar, so the
/// session cookie is sent with each call and refreshed from `Set-Cookie`.
#[derive(Debug, Clone)]
pub struct HttpStudyApi {
    client: Client,
    base_url: Url,
    jar: Arc<Jar>,
}

impl HttpStudyApi {
    pub fn new(
        base_url: &str,
        session_token: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::Transport(format!("invalid API URL {base_url}: {e}")))?;
        let jar = Arc::new(Jar::default());

        if let Some(token) = session_token {
            jar.add_cookie_str(&format!("{SESSION_COOKIE}={token}; Path=/"), &base_url);
        }

        let client = Client::builder()
            .cookie_provider(jar.clone())
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            jar,
        })
    }

    /// Current value of the session cookie, if the backend has set one.
    pub fn session_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        let header = header.to_str().ok()?;
        header.split(';').find_map(|segment| {
            let mut parts = segment.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            let value = parts.next()?.trim();
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Transport(format!("failed to build URL for {path}: {e}")))
    }

    /// Send a request and map non-2xx responses to errors.
    ///
    /// With `session_required`, 401/403 mean the session is gone. The login and
    /// register calls pass `false` so their rejection message reaches the user.
    #[instrument(skip(self, request))]
    async fn send(
        &self,
        request: RequestBuilder,
        call_name: &str,
        session_required: bool,
    ) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("failed to call {call_name}: {e}")))?;

        let status = response.status();
        if session_required && matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        {
            warn!("{call_name} rejected the session");
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message);
            warn!(status = status.as_u16(), "{call_name} returned error");
            return Err(ApiError::status(status.as_u16(), message));
        }

        debug!(status = status.as_u16(), "{call_name} ok");
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        call_name: &str,
    ) -> Result<T, ApiError> {
        let response = self.send(request, call_name, true).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(format!("failed to parse {call_name} response: {e}")))
    }

    async fn send_without_body(
        &self,
        request: RequestBuilder,
        call_name: &str,
    ) -> Result<(), ApiError> {
        let response = self.send(request, call_name, true).await?;
        let _ = response.bytes().await;
        Ok(())
    }

    fn chapters_path(subject: &SubjectId) -> Result<String, ApiError> {
        Ok(format!("/api/subject/{}/chapters", segment(subject.as_str())?))
    }

    fn scores_path(subject: &SubjectId, chapter: &ChapterId) -> Result<String, ApiError> {
        Ok(format!(
            "{}/{}/scores",
            Self::chapters_path(subject)?,
            segment(chapter.as_str())?
        ))
    }
}

/// Percent-encode an opaque id as a single path segment. Dot segments would be
/// resolved away when the path is joined, so they are refused.
fn segment(id: &str) -> Result<Cow<'_, str>, ApiError> {
    if matches!(id, "" | "." | "..") {
        return Err(ValidationError::InvalidId(id.to_string()).into());
    }
    Ok(urlencoding::encode(id))
}

#[async_trait]
impl StudyApi for HttpStudyApi {
    async fn me(&self) -> Result<User, ApiError> {
        let response: MeResponse = self
            .get_json(self.client.get(self.endpoint("/api/auth/me")?), "GET /api/auth/me")
            .await?;
        Ok(response.user)
    }

    async fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let response = self
            .send(
                self.client
                    .post(self.endpoint("/api/auth/login")?)
                    .json(credentials),
                "POST /api/auth/login",
                false,
            )
            .await?;
        let _ = response.bytes().await;
        Ok(())
    }

    async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let response = self
            .send(
                self.client
                    .post(self.endpoint("/api/auth/register")?)
                    .json(registration),
                "POST /api/auth/register",
                false,
            )
            .await?;
        let _ = response.bytes().await;
        Ok(())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.send_without_body(
            self.client.get(self.endpoint("/api/auth/logout")?),
            "GET /api/auth/logout",
        )
        .await
    }

    async fn revisions(&self) -> Result<Vec<Revision>, ApiError> {
        let response: RevisionsResponse = self
            .get_json(self.client.get(self.endpoint("/api/revision")?), "GET /api/revision")
            .await?;
        Ok(response.revisions)
    }

    async fn complete_revision(&self, id: &RevisionId) -> Result<(), ApiError> {
        let url = self.endpoint(&format!(
            "/api/revision/{}/completed",
            segment(id.as_str())?
        ))?;
        self.send_without_body(
            self.client.put(url),
            "PUT /api/revision/:id/completed",
        )
        .await
    }

    async fn subjects(&self) -> Result<Vec<Subject>, ApiError> {
        let response: SubjectsResponse = self
            .get_json(self.client.get(self.endpoint("/api/subject")?), "GET /api/subject")
            .await?;
        Ok(response.subjects)
    }

    async fn create_subject(&self, draft: &SubjectDraft) -> Result<(), ApiError> {
        self.send_without_body(
            self.client
                .post(self.endpoint("/api/subject/create")?)
                .json(&NameRequest { name: &draft.name }),
            "POST /api/subject/create",
        )
        .await
    }

    async fn delete_subject(&self, id: &SubjectId) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("/api/subject/{}", segment(id.as_str())?))?;
        self.send_without_body(
            self.client.delete(url),
            "DELETE /api/subject/:id",
        )
        .await
    }

    async fn subject_summary(&self, id: &SubjectId) -> Result<ScoreSummary, ApiError> {
        let url = self.endpoint(&format!("/api/subject/{}/scores", segment(id.as_str())?))?;
        let response: SummaryResponse = self
            .get_json(
                self.client.get(url),
                "GET /api/subject/:id/scores",
            )
            .await?;
        Ok(response.summary)
    }

    async fn chapters(&self, subject: &SubjectId) -> Result<Vec<Chapter>, ApiError> {
        let url = self.endpoint(&Self::chapters_path(subject)?)?;
        let response: ChaptersResponse = self
            .get_json(
                self.client.get(url),
                "GET /api/subject/:id/chapters",
            )
            .await?;
        Ok(response.chapters)
    }

    async fn create_chapter(
        &self,
        subject: &SubjectId,
        draft: &ChapterDraft,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&Self::chapters_path(subject)?)?;
        self.send_without_body(
            self.client
                .post(url)
                .json(&NameRequest { name: &draft.name }),
            "POST /api/subject/:id/chapters",
        )
        .await
    }

    async fn chapter_scores(
        &self,
        subject: &SubjectId,
        chapter: &ChapterId,
    ) -> Result<Vec<Score>, ApiError> {
        let response: ScoresResponse = self
            .get_json(
                self.client
                    .get(self.endpoint(&Self::scores_path(subject, chapter)?)?),
                "GET /api/subject/:id/chapters/:chapterId/scores",
            )
            .await?;
        Ok(response.scores)
    }

    async fn add_score(
        &self,
        subject: &SubjectId,
        chapter: &ChapterId,
        draft: &ScoreDraft,
    ) -> Result<(), ApiError> {
        self.send_without_body(
            self.client
                .post(self.endpoint(&Self::scores_path(subject, chapter)?)?)
                .json(&ScoreRequest::from(draft)),
            "POST /api/subject/:id/chapters/:chapterId/scores",
        )
        .await
    }

    async fn update_score(
        &self,
        subject: &SubjectId,
        chapter: &ChapterId,
        score: &ScoreId,
        draft: &ScoreDraft,
    ) -> Result<(), ApiError> {
        let path = format!(
            "{}/{}",
            Self::scores_path(subject, chapter)?,
            segment(score.as_str())?
        );
        self.send_without_body(
            self.client
                .put(self.endpoint(&path)?)
                .json(&ScoreRequest::from(draft)),
            "PUT /api/subject/:id/chapters/:chapterId/scores/:scoreId",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(token: Option<&str>) -> HttpStudyApi {
        HttpStudyApi::new("http://localhost:5000/", token, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn endpoints_are_rooted_at_the_base_url() {
        let api = api(None);
        assert_eq!(
            api.endpoint("/api/revision").unwrap().as_str(),
            "http://localhost:5000/api/revision"
        );
        assert_eq!(
            api.endpoint(
                &HttpStudyApi::scores_path(&SubjectId::new("s1"), &ChapterId::new("c2"))
                    .unwrap()
            )
            .unwrap()
            .as_str(),
            "http://localhost:5000/api/subject/s1/chapters/c2/scores"
        );
    }

    #[test]
    fn ids_stay_inside_their_path_segment() {
        let api = api(None);
        let path = format!("/api/revision/{}/completed", segment("../subject/s9").unwrap());
        assert_eq!(
            api.endpoint(&path).unwrap().as_str(),
            "http://localhost:5000/api/revision/..%2Fsubject%2Fs9/completed"
        );

        let path = format!("/api/revision/{}/completed", segment("r1?x=1#top").unwrap());
        let url = api.endpoint(&path).unwrap();
        assert_eq!(url.path(), "/api/revision/r1%3Fx%3D1%23top/completed");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn dot_and_empty_ids_are_refused() {
        for id in ["", ".", ".."] {
            let err = segment(id).unwrap_err();
            assert!(matches!(
                err,
                ApiError::Validation(ValidationError::InvalidId(_))
            ));
        }
        let err =
            HttpStudyApi::scores_path(&SubjectId::new(".."), &ChapterId::new("c1")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn stored_session_is_sent_as_cookie() {
        assert_eq!(api(Some("abc.def")).session_token().as_deref(), Some("abc.def"));
        assert_eq!(api(None).session_token(), None);
    }

    #[test]
    fn rejects_invalid_base_url() {
        let err = HttpStudyApi::new("not a url", None, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
