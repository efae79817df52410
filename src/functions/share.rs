/// Texto para compartir una estimación.
pub fn share_text(pickup: &str, dropoff: &str, total_fare: u32) -> String {
    format!(
        "I'm taking an auto from {} to {}. The estimated fare is ₹{}. Powered by FareFriend!",
        pickup.trim(),
        dropoff.trim(),
        total_fare
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_text() {
        assert_eq!(
            share_text(" Bandra Station", "Juhu Beach ", 85),
            "I'm taking an auto from Bandra Station to Juhu Beach. The estimated fare is ₹85. Powered by FareFriend!"
        );
    }
}
