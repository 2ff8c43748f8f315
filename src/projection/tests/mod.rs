mod test_grid_basic;
