//! Wire types for the match coordination service.
//!
//! The remote API speaks Spanish camelCase field names and has sent ids as
//! both strings and integers over its history. Everything in this module
//! stays at the transport boundary: the rest of the crate only sees the
//! canonical domain types from `lib.rs`.

use crate::{
    Match, MatchDraft, MatchEdit, MatchState, Participant, ParticipantKind, ProfileUpdate,
    Registration, ScoringKind, SkillLevel, Sport, TeamResult, User,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Ids arrive as either a JSON number or a JSON string.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum IdValue {
    Num(i64),
    Str(String),
}

impl IdValue {
    fn into_string(self) -> String {
        match self {
            IdValue::Num(n) => n.to_string(),
            IdValue::Str(s) => s,
        }
    }
}

impl Default for IdValue {
    fn default() -> Self {
        IdValue::Str(String::new())
    }
}

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MatchWire {
    pub id: IdValue,
    #[serde(default)]
    pub deporte: SportWire,
    pub cantidad_jugadores_req: u32,
    #[serde(default)]
    pub duracion_minutos: u32,
    #[serde(default)]
    pub ubicacion: String,
    pub barrio: Option<String>,
    #[serde(default)]
    pub horario: String,
    pub nivel_requerido: Option<String>,
    #[serde(default)]
    pub estado_actual_type: String,
    #[serde(default)]
    pub jugadores_inscritos: Vec<UserWire>,
    #[serde(default)]
    pub participantes: Vec<ParticipantWire>,
    #[serde(default)]
    pub creador: UserWire,
}

#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SportWire {
    pub id: IdValue,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub cantidad_jugadores_permitidos: u32,
    pub tipo_puntuacion: Option<String>,
}

#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserWire {
    #[serde(default)]
    pub id: Option<IdValue>,
    #[serde(default)]
    pub nombre_usuario: String,
    #[serde(default)]
    pub correo: String,
    pub deporte_favorito: Option<SportWire>,
    pub nivel: Option<String>,
    pub barrio: Option<String>,
}

#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantWire {
    pub id: IdValue,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub tipo: String,
    pub puntaje_obtenido: Option<i64>,
}

// ---------------------------------------------------------------------------
// Request shapes
// ---------------------------------------------------------------------------

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    pub deporte_id: String,
    pub cantidad_jugadores_req: u32,
    pub duracion_minutos: u32,
    pub ubicacion: String,
    pub horario: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nivel_requerido: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barrio: Option<String>,
    pub creador_id: String,
}

impl From<&MatchDraft> for CreateMatchRequest {
    fn from(draft: &MatchDraft) -> Self {
        CreateMatchRequest {
            deporte_id: draft.sport_id.clone(),
            cantidad_jugadores_req: draft.required_players,
            duracion_minutos: draft.duration_minutes,
            ubicacion: draft.location.clone(),
            horario: format_start(draft.starts_at),
            nivel_requerido: draft.min_skill.map(skill_to_wire),
            barrio: draft.area.clone(),
            creador_id: draft.creator_id.clone(),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EditMatchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ubicacion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duracion_minutos: Option<u32>,
}

impl From<&MatchEdit> for EditMatchRequest {
    fn from(edit: &MatchEdit) -> Self {
        EditMatchRequest {
            ubicacion: edit.location.clone(),
            horario: edit.starts_at.map(format_start),
            duracion_minutos: edit.duration_minutes,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TeamResultRequest {
    pub nombre_local: String,
    pub puntaje_local: u32,
    pub nombre_visitante: String,
    pub puntaje_visitante: u32,
}

impl From<&TeamResult> for TeamResultRequest {
    fn from(result: &TeamResult) -> Self {
        TeamResultRequest {
            nombre_local: result.home_name.clone(),
            puntaje_local: result.home_score,
            nombre_visitante: result.away_name.clone(),
            puntaje_visitante: result.away_score,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct LoginRequest<'a> {
    pub correo: &'a str,
    pub contrasenia: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub nombre_usuario: String,
    pub correo: String,
    pub contrasenia: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deporte_favorito_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nivel: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barrio: Option<String>,
}

impl From<&Registration> for RegisterRequest {
    fn from(reg: &Registration) -> Self {
        RegisterRequest {
            nombre_usuario: reg.username.clone(),
            correo: reg.email.clone(),
            contrasenia: reg.password.clone(),
            deporte_favorito_id: reg.favorite_sport_id.clone(),
            nivel: reg.skill.map(skill_to_wire),
            barrio: reg.area.clone(),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deporte_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nivel: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barrio: Option<String>,
}

impl From<&ProfileUpdate> for ProfileUpdateRequest {
    fn from(update: &ProfileUpdate) -> Self {
        ProfileUpdateRequest {
            deporte_id: update.sport_id.clone(),
            nivel: update.skill.map(skill_to_wire),
            barrio: update.area.clone(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct NotificationTokenRequest<'a> {
    pub token: &'a str,
}

// ---------------------------------------------------------------------------
// Mapping: wire → domain
// ---------------------------------------------------------------------------

pub fn map_match(w: MatchWire) -> Match {
    Match {
        id: w.id.into_string(),
        sport: map_sport(w.deporte),
        required_players: w.cantidad_jugadores_req,
        duration_minutes: w.duracion_minutos,
        location: w.ubicacion,
        area: w.barrio,
        starts_at: parse_start(&w.horario),
        min_skill: w.nivel_requerido.as_deref().and_then(parse_skill),
        state: parse_state(&w.estado_actual_type),
        enrolled: w.jugadores_inscritos.into_iter().map(map_user).collect(),
        participants: w.participantes.into_iter().map(map_participant).collect(),
        creator: map_user(w.creador),
    }
}

pub fn map_user(w: UserWire) -> User {
    User {
        id: w.id.map(IdValue::into_string).unwrap_or_default(),
        username: w.nombre_usuario,
        email: w.correo,
        favorite_sport: w.deporte_favorito.map(map_sport),
        skill: w.nivel.as_deref().and_then(parse_skill),
        area: w.barrio,
    }
}

fn map_sport(w: SportWire) -> Sport {
    Sport {
        id: w.id.into_string(),
        name: w.nombre,
        allowed_players: w.cantidad_jugadores_permitidos,
        scoring: match w.tipo_puntuacion.as_deref() {
            Some("SETS") => ScoringKind::Sets,
            _ => ScoringKind::Goals,
        },
    }
}

fn map_participant(w: ParticipantWire) -> Participant {
    Participant {
        id: w.id.into_string(),
        name: w.nombre,
        kind: if w.tipo.eq_ignore_ascii_case("EQUIPO") {
            ParticipantKind::Team
        } else {
            ParticipantKind::Individual
        },
        score: w.puntaje_obtenido,
    }
}

/// Unrecognized states map to `Unknown` so a server-side enum extension
/// renders as "no actions offered" instead of a client failure.
pub fn parse_state(s: &str) -> MatchState {
    match s {
        "NECESITAMOS_JUGADORES" => MatchState::NeedsPlayers,
        "PARTIDO_ARMADO" => MatchState::Assembled,
        "CONFIRMADO" => MatchState::Confirmed,
        "EN_JUEGO" => MatchState::InPlay,
        "FINALIZADO" => MatchState::Finished,
        "CANCELADO" => MatchState::Cancelled,
        _ => MatchState::Unknown,
    }
}

pub fn parse_skill(s: &str) -> Option<SkillLevel> {
    match s {
        "PRINCIPIANTE" => Some(SkillLevel::Beginner),
        "INTERMEDIO" => Some(SkillLevel::Intermediate),
        "AVANZADO" => Some(SkillLevel::Advanced),
        _ => None,
    }
}

pub fn skill_to_wire(level: SkillLevel) -> &'static str {
    match level {
        SkillLevel::Beginner => "PRINCIPIANTE",
        SkillLevel::Intermediate => "INTERMEDIO",
        SkillLevel::Advanced => "AVANZADO",
    }
}

const START_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// The service sends local time without a zone, occasionally with
/// fractional seconds or a stray trailing Z.
pub fn parse_start(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim().trim_end_matches('Z');
    NaiveDateTime::parse_from_str(trimmed, START_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .ok()
}

pub fn format_start(dt: NaiveDateTime) -> String {
    dt.format(START_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_maps_from_spanish_wire_names() {
        let raw = r#"{
            "id": 7,
            "deporte": {"id": "1", "nombre": "Futbol", "cantidadJugadoresPermitidos": 22, "tipoPuntuacion": "GOLES"},
            "cantidadJugadoresReq": 10,
            "duracionMinutos": 90,
            "ubicacion": "Cancha El Trebol, Palermo",
            "barrio": "Palermo",
            "horario": "2026-03-01T19:00:00",
            "nivelRequerido": "INTERMEDIO",
            "estadoActualType": "NECESITAMOS_JUGADORES",
            "jugadoresInscritos": [
                {"id": "u1", "nombreUsuario": "juanperez", "correo": "juan@test.com", "nivel": "AVANZADO"}
            ],
            "creador": {"id": 3, "nombreUsuario": "marting", "correo": "martin@test.com"}
        }"#;
        let wire: MatchWire = serde_json::from_str(raw).unwrap();
        let m = map_match(wire);

        assert_eq!(m.id, "7");
        assert_eq!(m.sport.name, "Futbol");
        assert_eq!(m.sport.scoring, ScoringKind::Goals);
        assert_eq!(m.required_players, 10);
        assert_eq!(m.location, "Cancha El Trebol, Palermo");
        assert_eq!(m.min_skill, Some(SkillLevel::Intermediate));
        assert_eq!(m.state, MatchState::NeedsPlayers);
        assert_eq!(m.enrolled.len(), 1);
        assert_eq!(m.enrolled[0].id, "u1");
        assert_eq!(m.enrolled[0].skill, Some(SkillLevel::Advanced));
        // Numeric ids normalize to strings.
        assert_eq!(m.creator.id, "3");
        assert_eq!(
            m.starts_at.map(|t| t.format("%Y-%m-%d %H:%M").to_string()),
            Some("2026-03-01 19:00".to_string())
        );
        assert!(m.participants.is_empty());
    }

    #[test]
    fn every_known_state_string_parses() {
        let pairs = [
            ("NECESITAMOS_JUGADORES", MatchState::NeedsPlayers),
            ("PARTIDO_ARMADO", MatchState::Assembled),
            ("CONFIRMADO", MatchState::Confirmed),
            ("EN_JUEGO", MatchState::InPlay),
            ("FINALIZADO", MatchState::Finished),
            ("CANCELADO", MatchState::Cancelled),
        ];
        for (wire, state) in pairs {
            assert_eq!(parse_state(wire), state);
        }
    }

    #[test]
    fn unrecognized_state_is_unknown_not_an_error() {
        assert_eq!(parse_state("SUSPENDIDO"), MatchState::Unknown);
        assert_eq!(parse_state(""), MatchState::Unknown);
    }

    #[test]
    fn participant_tipo_discriminates_team_from_individual() {
        let team = ParticipantWire {
            id: IdValue::Num(1),
            nombre: "Los Rojos".into(),
            tipo: "EQUIPO".into(),
            puntaje_obtenido: Some(3),
        };
        let player = ParticipantWire {
            id: IdValue::Str("p2".into()),
            nombre: "Ana".into(),
            tipo: "JUGADOR".into(),
            puntaje_obtenido: None,
        };
        assert_eq!(map_participant(team).kind, ParticipantKind::Team);
        let p = map_participant(player);
        assert_eq!(p.kind, ParticipantKind::Individual);
        assert_eq!(p.score, None);
    }

    #[test]
    fn start_time_parsing_is_lenient() {
        assert!(parse_start("2026-03-01T19:00:00").is_some());
        assert!(parse_start("2026-03-01T19:00:00.000").is_some());
        assert!(parse_start("2026-03-01T19:00:00Z").is_some());
        assert!(parse_start("2026-03-01T19:00").is_some());
        assert!(parse_start("next tuesday").is_none());
        assert!(parse_start("").is_none());
    }

    #[test]
    fn edit_request_skips_untouched_fields() {
        let edit = MatchEdit {
            location: Some("Club Atletico".into()),
            starts_at: None,
            duration_minutes: None,
        };
        let body = serde_json::to_value(EditMatchRequest::from(&edit)).unwrap();
        assert_eq!(body["ubicacion"], "Club Atletico");
        assert!(body.get("horario").is_none());
        assert!(body.get("duracionMinutos").is_none());
    }

    #[test]
    fn create_request_uses_wire_names_and_formats_time() {
        let draft = MatchDraft {
            sport_id: "1".into(),
            required_players: 10,
            duration_minutes: 60,
            location: "Cancha 2".into(),
            starts_at: parse_start("2026-03-01T19:00:00").unwrap(),
            min_skill: Some(SkillLevel::Advanced),
            area: None,
            creator_id: "u9".into(),
        };
        let body = serde_json::to_value(CreateMatchRequest::from(&draft)).unwrap();
        assert_eq!(body["deporteId"], "1");
        assert_eq!(body["cantidadJugadoresReq"], 10);
        assert_eq!(body["horario"], "2026-03-01T19:00:00");
        assert_eq!(body["nivelRequerido"], "AVANZADO");
        assert_eq!(body["creadorId"], "u9");
        assert!(body.get("barrio").is_none());
    }
}
