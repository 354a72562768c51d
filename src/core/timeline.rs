use crate::models::MeetReadiness;

/// Points lost per step of urgency difference
const ALIGNMENT_STEP: u8 = 20;

/// Outcome of comparing two meet-readiness preferences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineAlignment {
    /// 0-100, 100 for identical preferences
    pub score: u8,
    pub reason: String,
}

/// Compare the requester's meet readiness with a candidate's
///
/// Score drops linearly with the difference in urgency rank
/// (`100 - 20 * diff`), so the worst case (within 48h vs flexible) is 40.
pub fn align(requester: MeetReadiness, candidate: MeetReadiness) -> TimelineAlignment {
    if requester == candidate {
        return TimelineAlignment {
            score: 100,
            reason: format!("Both prefer {}", requester.label()),
        };
    }

    let diff = requester.urgency().abs_diff(candidate.urgency());
    TimelineAlignment {
        score: 100u8.saturating_sub(ALIGNMENT_STEP * diff),
        reason: format!(
            "You prefer {}, they prefer {}",
            requester.label(),
            candidate.label()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_reflexive() {
        for readiness in MeetReadiness::ALL {
            let result = align(readiness, readiness);
            assert_eq!(result.score, 100);
            assert!(result.reason.starts_with("Both prefer"));
        }
    }

    #[test]
    fn test_align_steps() {
        assert_eq!(align(MeetReadiness::Within48h, MeetReadiness::ThisWeekend).score, 80);
        assert_eq!(align(MeetReadiness::Within48h, MeetReadiness::AfterCoffeeChat).score, 60);
        assert_eq!(align(MeetReadiness::Within48h, MeetReadiness::Flexible).score, 40);
        assert_eq!(align(MeetReadiness::Flexible, MeetReadiness::Within48h).score, 40);
    }

    #[test]
    fn test_reason_is_asymmetric() {
        let result = align(MeetReadiness::ThisWeekend, MeetReadiness::Flexible);
        assert_eq!(
            result.reason,
            "You prefer meeting this weekend, they prefer a flexible timeline"
        );
    }
}
