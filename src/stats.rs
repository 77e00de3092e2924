//! Dashboard aggregation over results and voter lists

use crate::models::{ResultsSummary, Voter};
use serde::Serialize;

/// Votes for one candidate and their share of all votes cast
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CandidateTally {
    pub nomor_urut: u32,
    pub nama: String,
    pub votes: u64,
    /// Percentage of votes cast, 0 when nobody has voted
    pub share: f64,
}

/// Turnout within one faculty
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FacultyTurnout {
    pub fakultas: String,
    pub voted: u64,
    pub not_voted: u64,
}

/// Figures shown on the admin dashboard
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardStats {
    pub candidates: Vec<CandidateTally>,
    pub total_voters: u64,
    pub total_voted: u64,
    pub total_not_voted: u64,
    /// Percentage of registered voters who voted
    pub participation: f64,
    pub faculties: Vec<FacultyTurnout>,
}

impl DashboardStats {
    pub fn from_summary(summary: &ResultsSummary, voters: &[Voter]) -> Self {
        let total_voted = summary.total_pemilih_sudah_memilih;
        let total_voters = summary.total_pemilih;

        let mut candidates: Vec<CandidateTally> = summary
            .data
            .iter()
            .map(|k| CandidateTally {
                nomor_urut: k.nomor_urut,
                nama: k.nama.clone(),
                votes: k.total_suara,
                share: percentage(k.total_suara, total_voted),
            })
            .collect();
        candidates.sort_by_key(|c| c.nomor_urut);

        Self {
            candidates,
            total_voters,
            total_voted,
            total_not_voted: total_voters.saturating_sub(total_voted),
            participation: percentage(total_voted, total_voters),
            faculties: faculty_turnout(voters),
        }
    }

    /// Vote count of the candidate with ballot number `nomor_urut`
    pub fn votes_for(&self, nomor_urut: u32) -> u64 {
        self.candidates
            .iter()
            .find(|c| c.nomor_urut == nomor_urut)
            .map_or(0, |c| c.votes)
    }
}

/// Groups voters by faculty, keeping faculties in first-seen order
pub fn faculty_turnout(voters: &[Voter]) -> Vec<FacultyTurnout> {
    let mut faculties: Vec<FacultyTurnout> = Vec::new();
    for voter in voters {
        let idx = match faculties.iter().position(|f| f.fakultas == voter.fakultas) {
            Some(idx) => idx,
            None => {
                faculties.push(FacultyTurnout {
                    fakultas: voter.fakultas.clone(),
                    voted: 0,
                    not_voted: 0,
                });
                faculties.len() - 1
            }
        };
        if voter.sudah_memilih {
            faculties[idx].voted += 1;
        } else {
            faculties[idx].not_voted += 1;
        }
    }
    faculties
}

/// `part * 100 / whole`, or 0 for an empty whole
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Page numbers shown around `current`: up to two on each side, clipped to
/// `1..=total_pages`
pub fn page_window(current: u32, total_pages: u32) -> Vec<u32> {
    if total_pages == 0 {
        return Vec::new();
    }
    let current = current.clamp(1, total_pages);
    let start = current.saturating_sub(2).max(1);
    let end = current.saturating_add(2).min(total_pages);
    (start..=end).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Kandidat;
    use pretty_assertions::assert_eq;

    fn kandidat(nomor_urut: u32, nama: &str, total_suara: u64) -> Kandidat {
        Kandidat {
            kandidat_id: u64::from(nomor_urut) + 10,
            nomor_urut,
            nama: nama.to_string(),
            total_suara,
            extra: Default::default(),
        }
    }

    fn voter(id: u64, fakultas: &str, voted: bool) -> Voter {
        Voter {
            id,
            nim: format!("NIM{id}"),
            nama: format!("Voter {id}"),
            fakultas: fakultas.to_string(),
            program_studi: String::new(),
            token: None,
            sudah_memilih: voted,
            waktu_memilih: None,
        }
    }

    #[test]
    fn test_dashboard_totals() {
        let summary = ResultsSummary {
            data: vec![kandidat(2, "Pasangan B", 1), kandidat(1, "Pasangan A", 3)],
            total_pemilih: 10,
            total_pemilih_sudah_memilih: 4,
            ..ResultsSummary::default()
        };
        let voters = vec![
            voter(1, "Teknik", true),
            voter(2, "Hukum", false),
            voter(3, "Teknik", false),
            voter(4, "Teknik", true),
        ];

        let stats = DashboardStats::from_summary(&summary, &voters);

        assert_eq!(stats.total_not_voted, 6);
        assert_eq!(stats.participation, 40.0);
        assert_eq!(stats.candidates[0].nama, "Pasangan A");
        assert_eq!(stats.candidates[0].share, 75.0);
        assert_eq!(stats.votes_for(2), 1);
        assert_eq!(stats.votes_for(3), 0);
        assert_eq!(
            stats.faculties,
            vec![
                FacultyTurnout {
                    fakultas: "Teknik".to_string(),
                    voted: 2,
                    not_voted: 1
                },
                FacultyTurnout {
                    fakultas: "Hukum".to_string(),
                    voted: 0,
                    not_voted: 1
                },
            ]
        );
    }

    #[test]
    fn test_empty_election() {
        let stats = DashboardStats::from_summary(&ResultsSummary::default(), &[]);
        assert_eq!(stats.participation, 0.0);
        assert_eq!(stats.total_not_voted, 0);
        assert!(stats.faculties.is_empty());
    }

    #[test]
    fn test_inconsistent_totals_saturate() {
        let summary = ResultsSummary {
            total_pemilih: 3,
            total_pemilih_sudah_memilih: 5,
            ..ResultsSummary::default()
        };
        assert_eq!(DashboardStats::from_summary(&summary, &[]).total_not_voted, 0);
    }

    #[test]
    fn test_page_window() {
        assert_eq!(page_window(1, 10), vec![1, 2, 3]);
        assert_eq!(page_window(5, 10), vec![3, 4, 5, 6, 7]);
        assert_eq!(page_window(10, 10), vec![8, 9, 10]);
        assert_eq!(page_window(1, 1), vec![1]);
        assert_eq!(page_window(7, 3), vec![1, 2, 3]);
        assert!(page_window(1, 0).is_empty());
    }
}
